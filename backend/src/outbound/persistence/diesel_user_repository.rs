//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! A thin adapter: translates between Diesel row models and domain types
//! and maps store failures into `PersistenceError`. No business logic.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, UserRepository};
use crate::domain::{
    DisplayName, EmailAddress, NewUser, PasswordHash, User, UserAccount, UserChanges,
    UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserChangesRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Convert a database row to a domain user, dropping the credential hash.
fn row_to_user(row: UserRow) -> Result<User, PersistenceError> {
    let email = EmailAddress::new(row.email)
        .map_err(|err| PersistenceError::query(format!("stored email invalid: {err}")))?;
    let display_name = row
        .display_name
        .map(DisplayName::new)
        .transpose()
        .map_err(|err| {
            PersistenceError::query(format!("stored display name invalid: {err}"))
        })?;
    Ok(User::new(
        UserId::new(row.id),
        email,
        display_name,
        row.avatar,
        row.created_at,
        row.updated_at,
    ))
}

/// Convert a database row to a user plus its credential hash.
fn row_to_account(row: UserRow) -> Result<UserAccount, PersistenceError> {
    let password_hash = PasswordHash::new(row.password_hash.clone());
    let user = row_to_user(row)?;
    Ok(UserAccount {
        user,
        password_hash,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_str(),
            display_name: user.display_name.as_ref().map(AsRef::as_ref),
            avatar: user.avatar.as_deref(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account).transpose()
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = UserChangesRow {
            email: changes.email.as_ref().map(AsRef::as_ref),
            password_hash: changes.password_hash.as_ref().map(PasswordHash::as_str),
            display_name: changes.display_name.as_ref().map(AsRef::as_ref),
            avatar: changes.avatar.as_deref(),
            updated_at: Utc::now(),
        };

        let row: Option<UserRow> = diesel::update(users::table.find(id.get()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn sample_row(email: &str) -> UserRow {
        let now = Utc::now();
        UserRow {
            id: 7,
            email: email.to_owned(),
            password_hash: "$2b$10$hash".to_owned(),
            display_name: Some("Ada".to_owned()),
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn row_to_user_drops_the_hash() {
        let user = row_to_user(sample_row("a@x.com")).expect("valid row converts");
        assert_eq!(user.id().get(), 7);
        assert_eq!(user.email().as_ref(), "a@x.com");
        assert_eq!(user.display_name().map(AsRef::as_ref), Some("Ada"));
    }

    #[rstest]
    fn row_to_account_keeps_the_hash_for_verification() {
        let account = row_to_account(sample_row("a@x.com")).expect("valid row converts");
        assert_eq!(account.password_hash.as_str(), "$2b$10$hash");
        assert_eq!(account.user.email().as_ref(), "a@x.com");
    }

    #[rstest]
    fn corrupt_stored_email_surfaces_as_query_error() {
        let err = row_to_user(sample_row("not-an-email")).expect_err("corrupt row fails");
        assert!(matches!(err, PersistenceError::Query { .. }));
    }
}
