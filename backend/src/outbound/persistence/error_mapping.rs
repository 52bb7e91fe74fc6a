//! Mapping from pool and Diesel failures to domain persistence errors.
//!
//! Repositories never hand raw Diesel errors to the domain: constraint
//! violations become [`PersistenceError::Conflict`] so services can attach
//! caller-meaningful messages, connection-level failures become
//! [`PersistenceError::Connection`], and everything else is a query error.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::PersistenceError;

use super::pool::PoolError;

/// Map pool errors to domain persistence errors.
pub(crate) fn map_pool_error(error: PoolError) -> PersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to domain persistence errors.
pub(crate) fn map_diesel_error(error: DieselError) -> PersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            PersistenceError::conflict(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            PersistenceError::conflict(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PersistenceError::connection("database connection closed")
        }
        DieselError::NotFound => PersistenceError::query("record not found"),
        _ => PersistenceError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_owned()))
    }

    #[rstest]
    fn unique_violation_maps_to_conflict() {
        let mapped = map_diesel_error(database_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"users_email_key\"",
        ));
        assert!(matches!(mapped, PersistenceError::Conflict { .. }));
        assert!(mapped.to_string().contains("users_email_key"));
    }

    #[rstest]
    fn foreign_key_violation_maps_to_conflict() {
        let mapped = map_diesel_error(database_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "violates foreign key constraint \"votes_post_id_fkey\"",
        ));
        assert!(matches!(mapped, PersistenceError::Conflict { .. }));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let mapped = map_diesel_error(database_error(
            DatabaseErrorKind::ClosedConnection,
            "server closed the connection unexpectedly",
        ));
        assert!(matches!(mapped, PersistenceError::Connection { .. }));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let mapped = map_diesel_error(DieselError::NotFound);
        assert!(matches!(mapped, PersistenceError::Query { .. }));
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(mapped, PersistenceError::Connection { .. }));
        assert!(mapped.to_string().contains("timed out"));
    }
}
