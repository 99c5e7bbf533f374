pub mod prompt_override;
pub mod style_vote;
pub mod user_vote;

pub use prompt_override::Entity as PromptOverride;
pub use style_vote::Entity as StyleVote;
pub use user_vote::Entity as UserVote;
