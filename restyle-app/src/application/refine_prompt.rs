use crate::domain::RefinementRequest;
use crate::infrastructure::gemini::{build_refinement_prompt, GenerateContentRequest, GenerativeModel};
use crate::infrastructure::security::InputSanitizer;
use restyle_errors::AppError;
use std::sync::Arc;

/// Asks the text model to rewrite a filter prompt in light of its votes.
pub struct RefinePrompt {
    model: Option<Arc<dyn GenerativeModel>>,
    model_name: String,
}

impl RefinePrompt {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>, model_name: String) -> Self {
        Self { model, model_name }
    }

    pub async fn execute(&self, request: RefinementRequest) -> Result<String, AppError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| AppError::Configuration("GEMINI_API_KEY is not set".to_string()))?;

        let input = InputSanitizer::validate_refinement(request)?;
        let prompt = build_refinement_prompt(
            &input.filter_name,
            &input.original_prompt,
            input.thumbs_up,
            input.thumbs_down,
            input.feedback_context.as_deref(),
        );

        let response = model
            .generate_content(&self.model_name, &GenerateContentRequest::text(prompt))
            .await?;

        let refined = response.text().trim().to_string();
        if refined.is_empty() {
            tracing::warn!(
                filter = %input.filter_name,
                reason = response.stop_reason().as_deref().unwrap_or("unknown"),
                "Model returned no refinement"
            );
            return Err(AppError::NoRefinement);
        }

        tracing::info!(filter = %input.filter_name, "Prompt refined");
        Ok(refined)
    }
}
