//! PostgreSQL-backed `TaxonomyRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, TaxonomyRepository};
use crate::domain::{Category, CategoryId, CategoryName, Status, StatusId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CategoryRow, NewCategoryRow, StatusRow};
use super::pool::DbPool;
use super::schema::{categories, statuses};

/// Diesel-backed implementation of the `TaxonomyRepository` port.
#[derive(Clone)]
pub struct DieselTaxonomyRepository {
    pool: DbPool,
}

impl DieselTaxonomyRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_category(row: CategoryRow) -> Category {
    Category {
        id: CategoryId::new(row.id),
        name: row.name,
    }
}

fn row_to_status(row: StatusRow) -> Status {
    Status {
        id: StatusId::new(row.id),
        name: row.name,
    }
}

#[async_trait]
impl TaxonomyRepository for DieselTaxonomyRepository {
    async fn categories(&self) -> Result<Vec<Category>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CategoryRow> = categories::table
            .order(categories::id.asc())
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_category).collect())
    }

    async fn statuses(&self) -> Result<Vec<Status>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<StatusRow> = statuses::table
            .order(statuses::id.asc())
            .select(StatusRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_status).collect())
    }

    async fn find_category(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CategoryRow> = categories::table
            .find(id.get())
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_category))
    }

    async fn find_status(&self, id: StatusId) -> Result<Option<Status>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<StatusRow> = statuses::table
            .find(id.get())
            .select(StatusRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_status))
    }

    async fn insert_category(
        &self,
        name: &CategoryName,
    ) -> Result<Category, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: CategoryRow = diesel::insert_into(categories::table)
            .values(&NewCategoryRow {
                name: name.as_ref(),
            })
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_category(row))
    }
}
