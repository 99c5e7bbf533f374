use super::entities::{prompt_override, style_vote, user_vote, PromptOverride, StyleVote, UserVote};
use crate::domain::{self, Identity, StyleVoteAggregate, Vote, VoteType};
use crate::infrastructure::{InsertOutcome, VoteStore};
use async_trait::async_trait;
use restyle_errors::AppError;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};

pub struct SeaOrmVoteStore {
    db: DatabaseConnection,
}

impl SeaOrmVoteStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn storage(e: DbErr) -> AppError {
    AppError::Storage(e.to_string())
}

fn counter(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn to_aggregate(m: style_vote::Model) -> StyleVoteAggregate {
    StyleVoteAggregate {
        filter_name: m.filter_name,
        thumbs_up: counter(m.thumbs_up),
        thumbs_down: counter(m.thumbs_down),
        total_votes: counter(m.total_votes),
        last_modified: m.last_modified,
    }
}

fn to_vote(m: user_vote::Model) -> Result<Vote, AppError> {
    let vote_type = VoteType::parse(&m.vote_type)
        .ok_or_else(|| AppError::Storage(format!("unknown vote_type {:?}", m.vote_type)))?;
    Ok(Vote {
        id: m.id,
        filter_name: m.filter_name,
        generation_id: m.generation_id,
        user_id: m.user_id,
        browser_id: m.browser_id,
        vote_type,
        created_at: m.created_at,
    })
}

fn to_override(m: prompt_override::Model) -> domain::PromptOverride {
    domain::PromptOverride {
        filter_name: m.filter_name,
        original_prompt: m.original_prompt,
        refined_prompt: m.refined_prompt,
        reason: m.reason,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

/// `INSERT .. ON CONFLICT DO UPDATE SET thumbs_up = style_votes.thumbs_up + n, ..`
/// so concurrent votes never read-modify-write the tally.
async fn increment_tally<C: ConnectionTrait>(
    conn: &C,
    filter_name: &str,
    vote_type: VoteType,
) -> Result<(), DbErr> {
    let (up, down) = match vote_type {
        VoteType::Up => (1, 0),
        VoteType::Down => (0, 1),
    };

    let active = style_vote::ActiveModel {
        filter_name: Set(filter_name.to_string()),
        thumbs_up: Set(up),
        thumbs_down: Set(down),
        total_votes: Set(1),
        last_modified: Set(chrono::Utc::now()),
    };

    StyleVote::insert(active)
        .on_conflict(
            OnConflict::column(style_vote::Column::FilterName)
                .value(
                    style_vote::Column::ThumbsUp,
                    Expr::col((StyleVote, style_vote::Column::ThumbsUp)).add(up),
                )
                .value(
                    style_vote::Column::ThumbsDown,
                    Expr::col((StyleVote, style_vote::Column::ThumbsDown)).add(down),
                )
                .value(
                    style_vote::Column::TotalVotes,
                    Expr::col((StyleVote, style_vote::Column::TotalVotes)).add(1),
                )
                .update_column(style_vote::Column::LastModified)
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl VoteStore for SeaOrmVoteStore {
    async fn find_vote(
        &self,
        filter_name: &str,
        generation_id: &str,
        identity: &Identity,
    ) -> Result<Option<Vote>, AppError> {
        let query = UserVote::find()
            .filter(user_vote::Column::FilterName.eq(filter_name))
            .filter(user_vote::Column::GenerationId.eq(generation_id));

        let query = match &identity.user_id {
            Some(user_id) => query.filter(user_vote::Column::UserId.eq(user_id.as_str())),
            None => query
                .filter(user_vote::Column::UserId.is_null())
                .filter(user_vote::Column::BrowserId.eq(identity.browser_id.as_str())),
        };

        query
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(to_vote)
            .transpose()
    }

    async fn record_vote(&self, vote: &Vote) -> Result<InsertOutcome, AppError> {
        let active = user_vote::ActiveModel {
            id: Set(vote.id),
            user_id: Set(vote.user_id.clone()),
            browser_id: Set(vote.browser_id.clone()),
            filter_name: Set(vote.filter_name.clone()),
            vote_type: Set(vote.vote_type.as_str().to_string()),
            generation_id: Set(vote.generation_id.clone()),
            created_at: Set(vote.created_at),
        };

        let txn = self.db.begin().await.map_err(storage)?;

        // The partial unique indexes on user_votes turn a repeat vote into a
        // no-op insert.
        let inserted = UserVote::insert(active)
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(&txn)
            .await
            .map_err(storage)?;

        if inserted == 0 {
            txn.commit().await.map_err(storage)?;
            return Ok(InsertOutcome::Duplicate);
        }

        increment_tally(&txn, &vote.filter_name, vote.vote_type)
            .await
            .map_err(storage)?;
        txn.commit().await.map_err(storage)?;

        Ok(InsertOutcome::Inserted)
    }

    async fn aggregate(&self, filter_name: &str) -> Result<Option<StyleVoteAggregate>, AppError> {
        Ok(StyleVote::find_by_id(filter_name.to_string())
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(to_aggregate))
    }

    async fn list_aggregates(&self) -> Result<Vec<StyleVoteAggregate>, AppError> {
        let rows = StyleVote::find()
            .order_by_desc(style_vote::Column::LastModified)
            .all(&self.db)
            .await
            .map_err(storage)?;
        Ok(rows.into_iter().map(to_aggregate).collect())
    }

    async fn reset_filter(&self, filter_name: &str) -> Result<u64, AppError> {
        let zeroed = style_vote::ActiveModel {
            filter_name: Set(filter_name.to_string()),
            thumbs_up: Set(0),
            thumbs_down: Set(0),
            total_votes: Set(0),
            last_modified: Set(chrono::Utc::now()),
        };

        let txn = self.db.begin().await.map_err(storage)?;

        let deleted = UserVote::delete_many()
            .filter(user_vote::Column::FilterName.eq(filter_name))
            .exec(&txn)
            .await
            .map_err(storage)?
            .rows_affected;

        StyleVote::insert(zeroed)
            .on_conflict(
                OnConflict::column(style_vote::Column::FilterName)
                    .update_columns([
                        style_vote::Column::ThumbsUp,
                        style_vote::Column::ThumbsDown,
                        style_vote::Column::TotalVotes,
                        style_vote::Column::LastModified,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(storage)?;

        txn.commit().await.map_err(storage)?;
        Ok(deleted)
    }

    async fn prompt_override(
        &self,
        filter_name: &str,
    ) -> Result<Option<domain::PromptOverride>, AppError> {
        Ok(PromptOverride::find_by_id(filter_name.to_string())
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(to_override))
    }

    async fn upsert_prompt_override(
        &self,
        data: &domain::PromptOverride,
    ) -> Result<domain::PromptOverride, AppError> {
        let now = chrono::Utc::now();
        let active = prompt_override::ActiveModel {
            filter_name: Set(data.filter_name.clone()),
            original_prompt: Set(data.original_prompt.clone()),
            refined_prompt: Set(data.refined_prompt.clone()),
            reason: Set(data.reason.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // created_at is left alone on update.
        PromptOverride::insert(active)
            .on_conflict(
                OnConflict::column(prompt_override::Column::FilterName)
                    .update_columns([
                        prompt_override::Column::OriginalPrompt,
                        prompt_override::Column::RefinedPrompt,
                        prompt_override::Column::Reason,
                        prompt_override::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(storage)?;

        self.prompt_override(&data.filter_name).await?.ok_or_else(|| {
            AppError::Storage(format!("override for {} vanished", data.filter_name))
        })
    }

    async fn clear_all(&self) -> Result<(), AppError> {
        let txn = self.db.begin().await.map_err(storage)?;
        UserVote::delete_many().exec(&txn).await.map_err(storage)?;
        StyleVote::delete_many().exec(&txn).await.map_err(storage)?;
        txn.commit().await.map_err(storage)?;
        Ok(())
    }
}
