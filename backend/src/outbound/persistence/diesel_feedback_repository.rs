//! PostgreSQL-backed `PostRepository` implementation using Diesel ORM.
//!
//! List reads hydrate posts with author, taxonomy and a correlated vote
//! count in one round trip; the total for the pagination envelope is a
//! second filtered count query.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{PersistenceError, PostPage, PostRepository};
use crate::domain::{
    AuthorSummary, Category, CategoryId, DisplayName, EmailAddress, HydratedPost,
    ListFilter, Post, PostDescription, PostDraft, PostId, PostTitle, SortKey, Status,
    StatusId, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CategoryRow, NewPostRow, PostReplaceRow, PostRow, StatusRow, UserRow};
use super::pool::DbPool;
use super::schema::{categories, posts, statuses, users, votes};

/// Joined row shape produced by the hydrating queries.
type HydratedRow = (PostRow, UserRow, CategoryRow, StatusRow, Option<i64>);

/// Diesel-backed implementation of the `PostRepository` port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Correlated subquery counting the votes on the outer post row.
///
/// `COUNT` over an empty set is zero, so the value is never SQL `NULL`
/// despite the nullable subselect type. A macro rather than a function
/// because the full Diesel expression type is not worth naming.
macro_rules! vote_count {
    () => {
        votes::table
            .filter(votes::post_id.eq(posts::id))
            .select(count_star())
            .single_value()
    };
}

/// Convert a bare post row to the domain post.
fn row_to_post(row: PostRow) -> Result<Post, PersistenceError> {
    let title = PostTitle::new(row.title)
        .map_err(|err| PersistenceError::query(format!("stored title invalid: {err}")))?;
    let description = PostDescription::new(row.description).map_err(|err| {
        PersistenceError::query(format!("stored description invalid: {err}"))
    })?;
    Ok(Post {
        id: PostId::new(row.id),
        title,
        description,
        author_id: UserId::new(row.author_id),
        category_id: CategoryId::new(row.category_id),
        status_id: StatusId::new(row.status_id),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Convert a joined row set to the hydrated read model.
fn row_to_hydrated(row: HydratedRow) -> Result<HydratedPost, PersistenceError> {
    let (post_row, author_row, category_row, status_row, count) = row;

    let email = EmailAddress::new(author_row.email).map_err(|err| {
        PersistenceError::query(format!("stored author email invalid: {err}"))
    })?;
    let display_name = author_row
        .display_name
        .map(DisplayName::new)
        .transpose()
        .map_err(|err| {
            PersistenceError::query(format!("stored author display name invalid: {err}"))
        })?;
    let author = AuthorSummary {
        id: UserId::new(author_row.id),
        email,
        display_name,
        avatar: author_row.avatar,
    };

    Ok(HydratedPost {
        post: row_to_post(post_row)?,
        author,
        category: Category {
            id: CategoryId::new(category_row.id),
            name: category_row.name,
        },
        status: Status {
            id: StatusId::new(status_row.id),
            name: status_row.name,
        },
        vote_count: u64::try_from(count.unwrap_or(0)).unwrap_or(0),
    })
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn insert(
        &self,
        author_id: UserId,
        draft: &PostDraft,
    ) -> Result<Post, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewPostRow {
            title: draft.title.as_ref(),
            description: draft.description.as_ref(),
            author_id: author_id.get(),
            category_id: draft.category_id.get(),
            status_id: draft.status_id.get(),
        };

        let row: PostRow = diesel::insert_into(posts::table)
            .values(&new_row)
            .returning(PostRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_post(row)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PostRow> = posts::table
            .find(id.get())
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_post).transpose()
    }

    async fn find_hydrated(
        &self,
        id: PostId,
    ) -> Result<Option<HydratedPost>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<HydratedRow> = posts::table
            .inner_join(users::table)
            .inner_join(categories::table)
            .inner_join(statuses::table)
            .filter(posts::id.eq(id.get()))
            .select((
                PostRow::as_select(),
                UserRow::as_select(),
                CategoryRow::as_select(),
                StatusRow::as_select(),
                vote_count!(),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_hydrated).transpose()
    }

    async fn replace(
        &self,
        id: PostId,
        draft: &PostDraft,
    ) -> Result<Option<Post>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = PostReplaceRow {
            title: draft.title.as_ref(),
            description: draft.description.as_ref(),
            category_id: draft.category_id.get(),
            status_id: draft.status_id.get(),
            updated_at: Utc::now(),
        };

        let row: Option<PostRow> = diesel::update(posts::table.find(id.get()))
            .set(&changeset)
            .returning(PostRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_post).transpose()
    }

    async fn delete(&self, id: PostId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(posts::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn list(
        &self,
        filter: ListFilter,
        sort: SortKey,
        page: PageRequest,
    ) -> Result<PostPage, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = posts::table
            .inner_join(users::table)
            .inner_join(categories::table)
            .inner_join(statuses::table)
            .select((
                PostRow::as_select(),
                UserRow::as_select(),
                CategoryRow::as_select(),
                StatusRow::as_select(),
                vote_count!(),
            ))
            .into_boxed();

        if let Some(category_id) = filter.category_id {
            query = query.filter(posts::category_id.eq(category_id.get()));
        }
        if let Some(status_id) = filter.status_id {
            query = query.filter(posts::status_id.eq(status_id.get()));
        }

        query = match sort {
            SortKey::Recent => {
                query.order((posts::created_at.desc(), posts::id.desc()))
            }
            // Ascending id breaks vote-count ties in insertion order.
            SortKey::Votes => query.order((vote_count!().desc(), posts::id.asc())),
        };

        let rows: Vec<HydratedRow> = query
            .limit(page.limit())
            .offset(page.offset())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut count_query = posts::table.select(count_star()).into_boxed();
        if let Some(category_id) = filter.category_id {
            count_query = count_query.filter(posts::category_id.eq(category_id.get()));
        }
        if let Some(status_id) = filter.status_id {
            count_query = count_query.filter(posts::status_id.eq(status_id.get()));
        }
        let total: i64 = count_query
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_hydrated)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PostPage {
            items,
            total: u64::try_from(total).unwrap_or(0),
        })
    }
}
