use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOverride {
    pub filter_name: String,
    pub original_prompt: String,
    pub refined_prompt: String,
    pub reason: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PromptOverride {
    pub fn new(
        filter_name: String,
        original_prompt: String,
        refined_prompt: String,
        reason: String,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            filter_name,
            original_prompt,
            refined_prompt,
            reason,
            created_at: now,
            updated_at: now,
        }
    }
}
