use super::{FeedbackService, RefinePrompt};
use crate::domain::{PromptOverride, RefinementRequest};
use restyle_errors::AppError;
use std::sync::Arc;

/// Rewrites a filter's prompt once its votes cross the refinement policy,
/// then stores the result as the filter's override.
pub struct AutoRefine {
    feedback: Arc<FeedbackService>,
    refine_prompt: Arc<RefinePrompt>,
}

impl AutoRefine {
    pub fn new(feedback: Arc<FeedbackService>, refine_prompt: Arc<RefinePrompt>) -> Self {
        Self {
            feedback,
            refine_prompt,
        }
    }

    /// `Ok(None)` when the filter does not need refinement yet.
    pub async fn run(
        &self,
        filter_name: &str,
        original_prompt: &str,
        feedback_context: Option<String>,
    ) -> Result<Option<PromptOverride>, AppError> {
        if !self.feedback.needs_refinement(filter_name).await {
            return Ok(None);
        }
        let Some(tally) = self.feedback.vote_stats(filter_name).await else {
            return Ok(None);
        };

        // Refine from the prompt users actually voted on.
        let live_prompt = self
            .feedback
            .get_active_prompt(filter_name, original_prompt)
            .await;

        let refined = self
            .refine_prompt
            .execute(RefinementRequest {
                filter_name: Some(filter_name.to_string()),
                original_prompt: Some(live_prompt),
                thumbs_up_count: Some(tally.thumbs_up),
                thumbs_down_count: Some(tally.thumbs_down),
                feedback_context,
            })
            .await?;

        let reason = format!(
            "auto-refined after {}/{} negative votes",
            tally.thumbs_down, tally.total_votes
        );
        if !self
            .feedback
            .save_prompt_override(filter_name, original_prompt, &refined, &reason)
            .await
        {
            return Err(AppError::Storage(format!(
                "could not save refined prompt for {filter_name}"
            )));
        }

        Ok(self.feedback.prompt_override(filter_name).await)
    }
}
