use crate::domain::{PromptOverride, RefinementPolicy, StyleVoteAggregate, Vote, VoteType};
use crate::infrastructure::identity::IdentityProvider;
use crate::infrastructure::{InsertOutcome, VoteStore};
use restyle_errors::AppError;
use std::sync::Arc;

/// Votes, tallies and prompt overrides.
///
/// Storage failures never escape this type: they are logged and turned into
/// `false`, `None` or the caller's fallback value. Nothing is retried.
pub struct FeedbackService {
    store: Arc<dyn VoteStore>,
    policy: RefinementPolicy,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn VoteStore>, policy: RefinementPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> RefinementPolicy {
        self.policy
    }

    /// Records one vote per (filter, generation, voter). Returns `false` when
    /// the voter already rated this generation or storage failed.
    pub async fn record_vote(
        &self,
        identity: &dyn IdentityProvider,
        filter_name: &str,
        is_positive: bool,
        generation_id: &str,
    ) -> bool {
        match self
            .try_record_vote(identity, filter_name, is_positive, generation_id)
            .await
        {
            Ok(recorded) => recorded,
            Err(e) => {
                tracing::error!(filter = filter_name, generation = generation_id, "Failed to record vote: {}", e);
                false
            }
        }
    }

    async fn try_record_vote(
        &self,
        identity: &dyn IdentityProvider,
        filter_name: &str,
        is_positive: bool,
        generation_id: &str,
    ) -> Result<bool, AppError> {
        let identity = identity.get_user_identifier().await?;

        if self
            .store
            .find_vote(filter_name, generation_id, &identity)
            .await?
            .is_some()
        {
            tracing::debug!(
                filter = filter_name,
                generation = generation_id,
                voter = identity.voter_key(),
                "Vote already recorded"
            );
            return Ok(false);
        }

        let vote_type = VoteType::from_positive(is_positive);
        let vote = Vote::new(
            filter_name.to_string(),
            generation_id.to_string(),
            &identity,
            vote_type,
        );
        if self.store.record_vote(&vote).await? == InsertOutcome::Duplicate {
            return Ok(false);
        }

        tracing::info!(
            filter = filter_name,
            vote = vote_type.as_str(),
            voter = identity.voter_key(),
            "Vote recorded"
        );
        Ok(true)
    }

    pub async fn has_voted(
        &self,
        identity: &dyn IdentityProvider,
        filter_name: &str,
        generation_id: &str,
    ) -> bool {
        let result = async {
            let identity = identity.get_user_identifier().await?;
            self.store.find_vote(filter_name, generation_id, &identity).await
        }
        .await;

        match result {
            Ok(vote) => vote.is_some(),
            Err(e) => {
                tracing::error!(filter = filter_name, "Failed to look up vote: {}", e);
                false
            }
        }
    }

    pub async fn vote_stats(&self, filter_name: &str) -> Option<StyleVoteAggregate> {
        self.store.aggregate(filter_name).await.unwrap_or_else(|e| {
            tracing::error!(filter = filter_name, "Failed to read vote tally: {}", e);
            None
        })
    }

    pub async fn all_vote_stats(&self) -> Vec<StyleVoteAggregate> {
        self.store.list_aggregates().await.unwrap_or_else(|e| {
            tracing::error!("Failed to list vote tallies: {}", e);
            Vec::new()
        })
    }

    pub async fn needs_refinement(&self, filter_name: &str) -> bool {
        let tally = self.vote_stats(filter_name).await;
        self.policy.needs_refinement(tally.as_ref())
    }

    /// The override's refined prompt if one is stored, otherwise
    /// `original_prompt` unchanged.
    pub async fn get_active_prompt(&self, filter_name: &str, original_prompt: &str) -> String {
        match self.store.prompt_override(filter_name).await {
            Ok(Some(saved)) => saved.refined_prompt,
            Ok(None) => original_prompt.to_string(),
            Err(e) => {
                tracing::warn!(filter = filter_name, "Falling back to original prompt: {}", e);
                original_prompt.to_string()
            }
        }
    }

    pub async fn prompt_override(&self, filter_name: &str) -> Option<PromptOverride> {
        self.store.prompt_override(filter_name).await.unwrap_or_else(|e| {
            tracing::error!(filter = filter_name, "Failed to read prompt override: {}", e);
            None
        })
    }

    /// Stores the refined prompt and starts the filter over with no votes.
    pub async fn save_prompt_override(
        &self,
        filter_name: &str,
        original_prompt: &str,
        refined_prompt: &str,
        reason: &str,
    ) -> bool {
        let prompt_override = PromptOverride::new(
            filter_name.to_string(),
            original_prompt.to_string(),
            refined_prompt.to_string(),
            reason.to_string(),
        );

        if let Err(e) = self.store.upsert_prompt_override(&prompt_override).await {
            tracing::error!(filter = filter_name, "Failed to save prompt override: {}", e);
            return false;
        }
        tracing::info!(filter = filter_name, reason = reason, "Prompt override saved");

        self.reset_votes(filter_name).await
    }

    pub async fn reset_votes(&self, filter_name: &str) -> bool {
        match self.store.reset_filter(filter_name).await {
            Ok(deleted) => {
                tracing::info!(filter = filter_name, deleted, "Votes reset");
                true
            }
            Err(e) => {
                tracing::error!(filter = filter_name, "Failed to reset votes: {}", e);
                false
            }
        }
    }

    pub async fn clear_all_votes(&self) -> bool {
        match self.store.clear_all().await {
            Ok(()) => {
                tracing::warn!("All votes cleared");
                true
            }
            Err(e) => {
                tracing::error!("Failed to clear votes: {}", e);
                false
            }
        }
    }
}
