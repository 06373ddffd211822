//! PostgreSQL-backed `VoteRepository`.
//!
//! Lookups deliberately include soft-deleted rows: the (user, idea) pair is
//! unique for the life of the table, so a withdrawn vote is restored rather
//! than inserted again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{VoteRepository, VoteRepositoryError};
use crate::domain::{IdeaId, NewVote, UserId, Vote, VoteId, VoteView};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::models::{NewVoteRow, VoteRow, VoteUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{users, votes};

#[derive(Clone)]
pub struct DieselVoteRepository {
    pool: DbPool,
}

impl DieselVoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> VoteRepositoryError {
    map_basic_pool_error(error, VoteRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> VoteRepositoryError {
    if unique_violation(&error) == Some("votes_user_id_idea_id_key") {
        return VoteRepositoryError::already_voted();
    }
    map_basic_diesel_error(
        error,
        VoteRepositoryError::query,
        VoteRepositoryError::connection,
    )
}

#[async_trait]
impl VoteRepository for DieselVoteRepository {
    async fn find(&self, id: VoteId) -> Result<Option<Vote>, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<VoteRow> = votes::table
            .filter(votes::id.eq(id.get()))
            .select(VoteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Vote::from))
    }

    async fn find_for(
        &self,
        user: &UserId,
        idea: IdeaId,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<VoteRow> = votes::table
            .filter(votes::user_id.eq(user.as_uuid()))
            .filter(votes::idea_id.eq(idea.get()))
            .select(VoteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Vote::from))
    }

    async fn insert(&self, vote: &NewVote) -> Result<Vote, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(votes::table)
            .values(NewVoteRow {
                user_id: *vote.user_id.as_uuid(),
                idea_id: vote.idea_id.get(),
                voted_at: vote.voted_at,
            })
            .returning(VoteRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Vote::from(row))
    }

    async fn save(&self, vote: &Vote) -> Result<(), VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(votes::table.filter(votes::id.eq(vote.id.get())))
            .set(VoteUpdate::from(vote))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_idea(&self, idea: IdeaId) -> Result<Vec<VoteView>, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(i64, String, String, DateTime<Utc>)> = votes::table
            .inner_join(users::table.on(users::id.eq(votes::user_id)))
            .filter(votes::idea_id.eq(idea.get()))
            .filter(votes::is_deleted.eq(false))
            .order_by(votes::voted_at.desc())
            .select((votes::id, users::display_name, users::email, votes::voted_at))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(vote_id, user_name, user_email, voted_at)| VoteView {
                vote_id: VoteId::new(vote_id),
                user_name,
                user_email,
                voted_at,
            })
            .collect())
    }
}
