use serde::{Deserialize, Serialize};

/// Client traits that feed the browser fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserEnvironment {
    pub user_agent: String,
    pub language: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub color_depth: u32,
    /// Minutes from UTC, as reported by the client.
    pub timezone_offset: i32,
    pub hardware_concurrency: Option<u32>,
    pub platform: String,
}

impl BrowserEnvironment {
    pub fn components(&self) -> String {
        [
            self.user_agent.clone(),
            self.language.clone(),
            format!("{}x{}", self.screen_width, self.screen_height),
            self.color_depth.to_string(),
            self.timezone_offset.to_string(),
            self.hardware_concurrency
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            self.platform.clone(),
        ]
        .join("|")
    }

    pub fn fingerprint(&self) -> String {
        to_base36(u64::from(rolling_hash(&self.components())))
    }
}

/// 32-bit `h = h * 31 + c` over UTF-16 code units, wrapping, folded to
/// unsigned by absolute value.
pub fn rolling_hash(input: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    hash.unsigned_abs()
}

pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_hash() {
        assert_eq!(rolling_hash(""), 0);
        assert_eq!(rolling_hash("a"), 97);
        assert_eq!(rolling_hash("ab"), 97 * 31 + 98);
    }

    #[test]
    fn test_rolling_hash_wraps_instead_of_overflowing() {
        let long = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".repeat(20);
        assert_eq!(rolling_hash(&long), rolling_hash(&long));
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(3105), "2e9");
    }

    #[test]
    fn test_components_order() {
        let env = BrowserEnvironment {
            user_agent: "UA".into(),
            language: "en-US".into(),
            screen_width: 1920,
            screen_height: 1080,
            color_depth: 24,
            timezone_offset: -120,
            hardware_concurrency: Some(8),
            platform: "Linux".into(),
        };
        assert_eq!(env.components(), "UA|en-US|1920x1080|24|-120|8|Linux");
    }
}
