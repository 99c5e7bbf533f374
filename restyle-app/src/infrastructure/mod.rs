pub mod db;
pub mod gemini;
pub mod identity;
pub mod memory;
pub mod security;

mod vote_store;

pub use vote_store::{InsertOutcome, VoteStore};
