mod aggregate;
mod filter_request;
mod identity;
mod prompt_override;
mod refinement;
mod vote;

pub use aggregate::StyleVoteAggregate;
pub use filter_request::{ImageFilterRequest, RefinementRequest};
pub use identity::Identity;
pub use prompt_override::PromptOverride;
pub use refinement::RefinementPolicy;
pub use vote::{Vote, VoteType};
