mod client;
mod prompt;
mod types;

pub use client::GeminiClient;
pub use prompt::{build_refinement_prompt, sanitize_for_prompt};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineData, Part, PromptFeedback,
};

use async_trait::async_trait;
use restyle_errors::AppError;

/// A hosted model that answers `generateContent` calls.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AppError>;
}
