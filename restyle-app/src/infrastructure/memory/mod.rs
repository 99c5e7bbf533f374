use super::{InsertOutcome, VoteStore};
use crate::domain::{Identity, PromptOverride, StyleVoteAggregate, Vote};
use async_trait::async_trait;
use restyle_errors::AppError;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    votes: Vec<Vote>,
    aggregates: HashMap<String, StyleVoteAggregate>,
    overrides: HashMap<String, PromptOverride>,
}

/// Process-local store used when no database is configured, and in tests.
/// Every operation holds one lock, so tally updates never interleave.
#[derive(Default)]
pub struct InMemoryVoteStore {
    tables: Mutex<Tables>,
}

impl InMemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn vote_count(&self, filter_name: &str) -> usize {
        let tables = self.tables.lock().await;
        tables
            .votes
            .iter()
            .filter(|v| v.filter_name == filter_name)
            .count()
    }
}

#[async_trait]
impl VoteStore for InMemoryVoteStore {
    async fn find_vote(
        &self,
        filter_name: &str,
        generation_id: &str,
        identity: &Identity,
    ) -> Result<Option<Vote>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .votes
            .iter()
            .find(|v| {
                v.filter_name == filter_name
                    && v.generation_id == generation_id
                    && v.is_cast_by(identity)
            })
            .cloned())
    }

    async fn record_vote(&self, vote: &Vote) -> Result<InsertOutcome, AppError> {
        let mut tables = self.tables.lock().await;
        let identity = Identity {
            user_id: vote.user_id.clone(),
            browser_id: vote.browser_id.clone(),
        };
        let duplicate = tables.votes.iter().any(|v| {
            v.filter_name == vote.filter_name
                && v.generation_id == vote.generation_id
                && v.is_cast_by(&identity)
        });
        if duplicate {
            return Ok(InsertOutcome::Duplicate);
        }

        tables.votes.push(vote.clone());
        tables
            .aggregates
            .entry(vote.filter_name.clone())
            .or_insert_with(|| StyleVoteAggregate::empty(vote.filter_name.as_str()))
            .record(vote.vote_type);
        Ok(InsertOutcome::Inserted)
    }

    async fn aggregate(&self, filter_name: &str) -> Result<Option<StyleVoteAggregate>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.aggregates.get(filter_name).cloned())
    }

    async fn list_aggregates(&self) -> Result<Vec<StyleVoteAggregate>, AppError> {
        let tables = self.tables.lock().await;
        let mut all: Vec<_> = tables.aggregates.values().cloned().collect();
        all.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(all)
    }

    async fn reset_filter(&self, filter_name: &str) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().await;
        let before = tables.votes.len();
        tables.votes.retain(|v| v.filter_name != filter_name);
        let deleted = (before - tables.votes.len()) as u64;
        tables
            .aggregates
            .entry(filter_name.to_string())
            .or_insert_with(|| StyleVoteAggregate::empty(filter_name))
            .reset();
        Ok(deleted)
    }

    async fn prompt_override(&self, filter_name: &str) -> Result<Option<PromptOverride>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.overrides.get(filter_name).cloned())
    }

    async fn upsert_prompt_override(
        &self,
        prompt_override: &PromptOverride,
    ) -> Result<PromptOverride, AppError> {
        let mut tables = self.tables.lock().await;
        let saved = match tables.overrides.get(&prompt_override.filter_name) {
            Some(existing) => PromptOverride {
                created_at: existing.created_at,
                updated_at: chrono::Utc::now(),
                ..prompt_override.clone()
            },
            None => prompt_override.clone(),
        };
        tables
            .overrides
            .insert(saved.filter_name.clone(), saved.clone());
        Ok(saved)
    }

    async fn clear_all(&self) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        tables.votes.clear();
        tables.aggregates.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VoteType;

    #[tokio::test]
    async fn test_insert_rejects_same_generation_and_identity() {
        let store = InMemoryVoteStore::new();
        let identity = Identity::anonymous("browser-1");
        let vote = Vote::new("Noir".into(), "gen-1".into(), &identity, VoteType::Up);

        assert_eq!(store.record_vote(&vote).await.unwrap(), InsertOutcome::Inserted);
        let again = Vote::new("Noir".into(), "gen-1".into(), &identity, VoteType::Down);
        assert_eq!(store.record_vote(&again).await.unwrap(), InsertOutcome::Duplicate);

        let next_generation = Vote::new("Noir".into(), "gen-2".into(), &identity, VoteType::Down);
        assert_eq!(
            store.record_vote(&next_generation).await.unwrap(),
            InsertOutcome::Inserted
        );
    }

    #[tokio::test]
    async fn test_user_id_takes_precedence_over_browser_id() {
        let store = InMemoryVoteStore::new();
        let signed_in = Identity::authenticated("user-1", "browser-1");
        let vote = Vote::new("Noir".into(), "gen-1".into(), &signed_in, VoteType::Up);
        store.record_vote(&vote).await.unwrap();

        // Same user on another browser is still the same voter.
        let elsewhere = Identity::authenticated("user-1", "browser-2");
        assert!(store.find_vote("Noir", "gen-1", &elsewhere).await.unwrap().is_some());

        // Anonymous visitor sharing the browser is not.
        let anonymous = Identity::anonymous("browser-1");
        assert!(store.find_vote("Noir", "gen-1", &anonymous).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_votes_are_all_counted() {
        let store = std::sync::Arc::new(InMemoryVoteStore::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let identity = Identity::anonymous(format!("browser-{i}"));
                let vote_type = VoteType::from_positive(i % 2 == 0);
                let vote = Vote::new("Noir".into(), "gen-1".into(), &identity, vote_type);
                store.record_vote(&vote).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let aggregate = store.aggregate("Noir").await.unwrap().unwrap();
        assert_eq!(aggregate.thumbs_up, 25);
        assert_eq!(aggregate.thumbs_down, 25);
        assert_eq!(aggregate.total_votes, 50);
        assert_eq!(store.vote_count("Noir").await, 50);
    }

    #[tokio::test]
    async fn test_duplicate_is_not_counted() {
        let store = InMemoryVoteStore::new();
        let identity = Identity::anonymous("browser-1");
        let first = Vote::new("Noir".into(), "gen-1".into(), &identity, VoteType::Up);
        let again = Vote::new("Noir".into(), "gen-1".into(), &identity, VoteType::Down);

        store.record_vote(&first).await.unwrap();
        store.record_vote(&again).await.unwrap();

        let aggregate = store.aggregate("Noir").await.unwrap().unwrap();
        assert_eq!((aggregate.thumbs_up, aggregate.thumbs_down, aggregate.total_votes), (1, 0, 1));
    }

    #[tokio::test]
    async fn test_reset_filter_creates_zero_row() {
        let store = InMemoryVoteStore::new();
        let identity = Identity::anonymous("browser-1");
        store
            .record_vote(&Vote::new("Noir".into(), "gen-1".into(), &identity, VoteType::Up))
            .await
            .unwrap();

        assert_eq!(store.reset_filter("Noir").await.unwrap(), 1);
        assert_eq!(store.reset_filter("Pop Art").await.unwrap(), 0);

        assert_eq!(store.aggregate("Noir").await.unwrap().unwrap().total_votes, 0);
        assert_eq!(store.aggregate("Pop Art").await.unwrap().unwrap().total_votes, 0);
        assert!(store.find_vote("Noir", "gen-1", &identity).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_override_keeps_created_at() {
        let store = InMemoryVoteStore::new();
        let first = PromptOverride::new("Noir".into(), "a".into(), "b".into(), "r1".into());
        let saved = store.upsert_prompt_override(&first).await.unwrap();

        let second = PromptOverride::new("Noir".into(), "a".into(), "c".into(), "r2".into());
        let updated = store.upsert_prompt_override(&second).await.unwrap();

        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(updated.refined_prompt, "c");
        assert_eq!(
            store.prompt_override("Noir").await.unwrap().unwrap().reason,
            "r2"
        );
    }
}
