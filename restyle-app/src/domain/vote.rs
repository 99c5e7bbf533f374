use super::Identity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn from_positive(is_positive: bool) -> Self {
        if is_positive {
            Self::Up
        } else {
            Self::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: uuid::Uuid,
    pub filter_name: String,
    pub generation_id: String,
    pub user_id: Option<String>,
    pub browser_id: String,
    pub vote_type: VoteType,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Vote {
    pub fn new(
        filter_name: String,
        generation_id: String,
        identity: &Identity,
        vote_type: VoteType,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            filter_name,
            generation_id,
            user_id: identity.user_id.clone(),
            browser_id: identity.browser_id.clone(),
            vote_type,
            created_at: chrono::Utc::now(),
        }
    }

    /// Whether this vote was cast by `identity`, using the same precedence as
    /// [`Identity::voter_key`].
    pub fn is_cast_by(&self, identity: &Identity) -> bool {
        match &identity.user_id {
            Some(user_id) => self.user_id.as_deref() == Some(user_id.as_str()),
            None => self.user_id.is_none() && self.browser_id == identity.browser_id,
        }
    }
}
