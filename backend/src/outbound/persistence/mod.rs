//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel models
//!   and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are implementation details, never exposed
//!   to the domain layer.
//! - **Strongly typed errors**: every database failure is mapped to a
//!   `PersistenceError` variant in one place (`error_mapping.rs`).

mod diesel_feedback_repository;
mod diesel_taxonomy_repository;
mod diesel_user_repository;
mod diesel_vote_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_feedback_repository::DieselPostRepository;
pub use diesel_taxonomy_repository::DieselTaxonomyRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_vote_repository::DieselVoteRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::domain::ports::PersistenceError;

/// Migrations compiled into the binary from `backend/migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Run any pending migrations against the given database.
///
/// Migrations run on a dedicated blocking thread over a plain synchronous
/// connection; the async pool is built afterwards.
///
/// # Errors
///
/// Returns [`PersistenceError::Connection`] when the database is
/// unreachable and [`PersistenceError::Query`] when a migration fails.
pub async fn run_migrations(database_url: &str) -> Result<(), PersistenceError> {
    let database_url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = diesel::PgConnection::establish(&database_url)
            .map_err(|err| PersistenceError::connection(err.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|err| PersistenceError::query(format!("migration failed: {err}")))
    })
    .await
    .map_err(|err| PersistenceError::query(format!("migration task failed: {err}")))?
}
