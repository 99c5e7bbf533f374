use super::StyleVoteAggregate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_VOTE_THRESHOLD: u32 = 20;
pub const DEVELOPMENT_VOTE_THRESHOLD: u32 = 5;
pub const DEFAULT_NEGATIVE_RATIO_THRESHOLD: f64 = 0.6;

/// Decides when a filter's prompt has collected enough negative feedback to
/// be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementPolicy {
    pub vote_threshold: u32,
    pub negative_ratio_threshold: f64,
}

impl RefinementPolicy {
    pub fn new(vote_threshold: u32, negative_ratio_threshold: f64) -> Self {
        Self {
            vote_threshold,
            negative_ratio_threshold,
        }
    }

    /// Lower threshold for local and test configurations.
    pub fn development() -> Self {
        Self::new(DEVELOPMENT_VOTE_THRESHOLD, DEFAULT_NEGATIVE_RATIO_THRESHOLD)
    }

    pub fn needs_refinement(&self, aggregate: Option<&StyleVoteAggregate>) -> bool {
        let Some(aggregate) = aggregate else {
            return false;
        };
        if aggregate.total_votes == 0 || aggregate.total_votes < self.vote_threshold {
            return false;
        }
        aggregate.negative_ratio() >= self.negative_ratio_threshold
    }
}

impl Default for RefinementPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_VOTE_THRESHOLD, DEFAULT_NEGATIVE_RATIO_THRESHOLD)
    }
}
