use serde::{Deserialize, Serialize};

/// Body of `POST /api/apply-image-filter`. Fields are optional so a missing
/// one is reported as a validation error instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFilterRequest {
    pub image_base64: Option<String>,
    pub mime_type: Option<String>,
    pub prompt: Option<String>,
}

/// Body of `POST /api/refine-prompt`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementRequest {
    pub filter_name: Option<String>,
    pub original_prompt: Option<String>,
    pub thumbs_up_count: Option<u32>,
    pub thumbs_down_count: Option<u32>,
    pub feedback_context: Option<String>,
}
