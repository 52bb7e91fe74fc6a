//! Account service: registration, login and profile management over the
//! user repository, password hasher and token codec ports.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::auth::{
    AuthenticatedAccount, Credentials, ProfileChanges, Registration, TokenClaims,
};
use super::error::Error;
use super::ports::{
    AccountService, PasswordHashError, PasswordHasher, PersistenceError, TokenCodec,
    TokenError, UserRepository, map_persistence_error,
};
use super::user::{NewUser, User, UserChanges, UserId};

/// The generic credential failure returned for both unknown emails and
/// password mismatches so callers cannot probe which check failed.
const BAD_CREDENTIALS: &str = "invalid email or password";

const EMAIL_TAKEN: &str = "email already registered";

/// Default implementation of [`AccountService`].
#[derive(Clone)]
pub struct AccountServiceImpl {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
}

impl AccountServiceImpl {
    /// Create a service over the given ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    fn issue_token(&self, user: &User) -> Result<AuthenticatedAccount, Error> {
        let claims = TokenClaims {
            user_id: user.id(),
            email: user.email().clone(),
        };
        let token = self.tokens.issue(&claims).map_err(map_token_error)?;
        Ok(AuthenticatedAccount {
            user: user.clone(),
            token,
        })
    }
}

fn map_token_error(error: TokenError) -> Error {
    tracing::error!(error = %error, "token issuance failed");
    Error::internal("internal server error")
}

fn map_hash_error(error: PasswordHashError) -> Error {
    tracing::error!(error = %error, "password hashing failed");
    Error::internal("internal server error")
}

#[async_trait]
impl AccountService for AccountServiceImpl {
    async fn register(
        &self,
        registration: Registration,
    ) -> Result<AuthenticatedAccount, Error> {
        let Registration {
            credentials,
            display_name,
            avatar,
        } = registration;

        // The insert's unique constraint is authoritative; this lookup only
        // gives duplicate registrations a friendlier, earlier answer.
        let existing = self
            .users
            .find_account_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?;
        if existing.is_some() {
            return Err(Error::conflict(EMAIL_TAKEN));
        }

        let password_hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(map_hash_error)?;

        let new_user = NewUser {
            email: credentials.email().clone(),
            password_hash,
            display_name,
            avatar,
        };
        let user = match self.users.insert(&new_user).await {
            Ok(user) => user,
            Err(PersistenceError::Conflict { .. }) => {
                return Err(Error::conflict(EMAIL_TAKEN));
            }
            Err(other) => return Err(map_persistence_error(other)),
        };

        info!(user_id = %user.id(), "account registered");
        self.issue_token(&user)
    }

    async fn login(
        &self,
        credentials: Credentials,
    ) -> Result<AuthenticatedAccount, Error> {
        let Some(account) = self
            .users
            .find_account_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?
        else {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        };

        let valid = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !valid {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }

        self.issue_token(&account.user)
    }

    async fn profile(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<User, Error> {
        if changes.is_empty() {
            return self.profile(user_id).await;
        }

        let ProfileChanges {
            email,
            password,
            display_name,
            avatar,
        } = changes;

        let password_hash = match password {
            Some(raw) => Some(self.hasher.hash(&raw).await.map_err(map_hash_error)?),
            None => None,
        };

        let record_changes = UserChanges {
            email,
            password_hash,
            display_name,
            avatar,
        };

        match self.users.update(user_id, &record_changes).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(Error::not_found("user not found")),
            Err(PersistenceError::Conflict { .. }) => Err(Error::conflict(EMAIL_TAKEN)),
            Err(other) => Err(map_persistence_error(other)),
        }
    }

    async fn delete_account(&self, user_id: UserId) -> Result<(), Error> {
        let removed = self
            .users
            .delete(user_id)
            .await
            .map_err(map_persistence_error)?;
        if !removed {
            return Err(Error::not_found("user not found"));
        }
        info!(user_id = %user_id, "account deleted");
        Ok(())
    }
}
