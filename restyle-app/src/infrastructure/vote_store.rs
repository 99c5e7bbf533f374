use crate::domain::{Identity, PromptOverride, StyleVoteAggregate, Vote};
use async_trait::async_trait;
use restyle_errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A vote for the same (filter, generation, identity) already exists.
    Duplicate,
}

/// Persistence for `user_votes`, `style_votes` and `prompt_overrides`.
///
/// `filter_name` is unique in both `style_votes` and `prompt_overrides`.
#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn find_vote(
        &self,
        filter_name: &str,
        generation_id: &str,
        identity: &Identity,
    ) -> Result<Option<Vote>, AppError>;

    /// Stores the vote and adds it to the filter's tally as one unit: either
    /// both happen or neither does. A vote already cast by the same voter
    /// for the same generation is reported as `Duplicate` and not counted.
    async fn record_vote(&self, vote: &Vote) -> Result<InsertOutcome, AppError>;

    async fn aggregate(&self, filter_name: &str) -> Result<Option<StyleVoteAggregate>, AppError>;

    async fn list_aggregates(&self) -> Result<Vec<StyleVoteAggregate>, AppError>;

    /// Deletes the filter's votes and zeroes its tally (creating a zero row
    /// if none exists) as one unit. Returns the number of votes deleted.
    async fn reset_filter(&self, filter_name: &str) -> Result<u64, AppError>;

    async fn prompt_override(&self, filter_name: &str) -> Result<Option<PromptOverride>, AppError>;

    async fn upsert_prompt_override(
        &self,
        prompt_override: &PromptOverride,
    ) -> Result<PromptOverride, AppError>;

    /// Drops every vote and tally. Overrides are kept.
    async fn clear_all(&self) -> Result<(), AppError>;
}
