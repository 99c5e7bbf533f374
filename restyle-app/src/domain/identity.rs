use serde::{Deserialize, Serialize};

/// Who cast a vote. `user_id` wins over `browser_id` when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: Option<String>,
    pub browser_id: String,
}

impl Identity {
    pub fn anonymous(browser_id: impl Into<String>) -> Self {
        Self {
            user_id: None,
            browser_id: browser_id.into(),
        }
    }

    pub fn authenticated(user_id: impl Into<String>, browser_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            browser_id: browser_id.into(),
        }
    }

    /// Key used to deduplicate votes.
    pub fn voter_key(&self) -> &str {
        self.user_id.as_deref().unwrap_or(&self.browser_id)
    }
}
