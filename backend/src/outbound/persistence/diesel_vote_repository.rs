//! PostgreSQL-backed `VoteRepository` implementation using Diesel ORM.
//!
//! Toggle atomicity rides on the composite primary key: the insert uses
//! `ON CONFLICT DO NOTHING`, so a concurrent duplicate resolves to zero
//! inserted rows instead of an error, and the caller observes the state
//! the winner wrote.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, VoteRepository};
use crate::domain::{PostId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewVoteRow;
use super::pool::DbPool;
use super::schema::votes;

/// Diesel-backed implementation of the `VoteRepository` port.
#[derive(Clone)]
pub struct DieselVoteRepository {
    pool: DbPool,
}

impl DieselVoteRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoteRepository for DieselVoteRepository {
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewVoteRow {
            user_id: user_id.get(),
            post_id: post_id.get(),
        };

        let inserted = diesel::insert_into(votes::table)
            .values(&new_row)
            .on_conflict((votes::user_id, votes::post_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(inserted > 0)
    }

    async fn remove(
        &self,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(
            votes::table
                .filter(votes::user_id.eq(user_id.get()))
                .filter(votes::post_id.eq(post_id.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn voted_post_ids(
        &self,
        user_id: UserId,
        post_ids: &[PostId],
    ) -> Result<Vec<PostId>, PersistenceError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let raw_ids: Vec<i32> = post_ids.iter().map(|id| id.get()).collect();
        let voted: Vec<i32> = votes::table
            .filter(votes::user_id.eq(user_id.get()))
            .filter(votes::post_id.eq_any(raw_ids))
            .select(votes::post_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(voted.into_iter().map(PostId::new).collect())
    }
}
