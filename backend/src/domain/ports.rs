//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain expects to interact with outbound
//! adapters (the relational store, the password hasher, the token codec).
//! Driving ports are the service traits HTTP handlers depend on. Each trait
//! exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning a catch-all.

use async_trait::async_trait;
use pagination::PageRequest;
use thiserror::Error;

use super::auth::{
    AccessToken, AuthenticatedAccount, Credentials, ProfileChanges, Registration,
    TokenClaims,
};
use super::error::Error as DomainError;
use super::feedback::{
    FeedbackItem, FeedbackListQuery, FeedbackPage, HydratedPost, ListFilter, Post, PostDraft,
    PostId, SortKey, VoteOutcome,
};
use super::taxonomy::{Category, CategoryId, CategoryName, Status, StatusId};
use super::user::{
    EmailAddress, NewUser, PasswordHash, User, UserAccount, UserChanges, UserId,
};

/// Errors surfaced by repository adapters backed by the relational store.
///
/// All repositories share one error shape: they talk to the same store and
/// fail in the same three ways.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Store connection could not be established or checked out.
    #[error("store connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("store query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A uniqueness or referential constraint rejected the mutation.
    #[error("store constraint violated: {message}")]
    Conflict {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl PersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for constraint violations.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Map a persistence failure to the transport-facing domain error.
///
/// Conflicts are deliberately not mapped here: services intercept them to
/// attach a caller-meaningful message before this fallback applies.
#[must_use]
pub fn map_persistence_error(error: PersistenceError) -> DomainError {
    match error {
        PersistenceError::Connection { message } => {
            tracing::error!(error = %message, "store connection failure");
            DomainError::unavailable("service temporarily unavailable")
        }
        PersistenceError::Query { message } | PersistenceError::Conflict { message } => {
            tracing::error!(error = %message, "store query failure");
            DomainError::internal("internal server error")
        }
    }
}

/// Errors surfaced by the password hashing adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// Hash computation failed.
    #[error("password hashing failed: {message}")]
    Hash {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Verification against a stored hash failed to run.
    #[error("password verification failed: {message}")]
    Verify {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl PasswordHashError {
    /// Helper for hash computation failures.
    pub fn hash(message: impl Into<String>) -> Self {
        Self::Hash {
            message: message.into(),
        }
    }

    /// Helper for verification failures.
    pub fn verify(message: impl Into<String>) -> Self {
        Self::Verify {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the token codec adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signing a fresh token failed.
    #[error("token issuance failed: {message}")]
    Issue {
        /// Adapter-provided failure description.
        message: String,
    },
    /// The token's signature or structure is invalid.
    #[error("token is invalid")]
    Invalid,
    /// The token's validity window has passed.
    #[error("token has expired")]
    Expired,
}

impl TokenError {
    /// Helper for signing failures.
    pub fn issue(message: impl Into<String>) -> Self {
        Self::Issue {
            message: message.into(),
        }
    }
}

/// Persistence port for user aggregates.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, failing with [`PersistenceError::Conflict`] when
    /// the email is taken.
    async fn insert(&self, user: &NewUser) -> Result<User, PersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError>;

    /// Fetch a user together with the stored credential hash by email.
    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, PersistenceError>;

    /// Apply a partial update, returning the fresh record or `None` when
    /// the user no longer exists. Email changes fail with
    /// [`PersistenceError::Conflict`] when the address is taken.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, PersistenceError>;

    /// Delete a user; authored posts and votes cascade in the store.
    /// Returns whether a row was removed.
    async fn delete(&self, id: UserId) -> Result<bool, PersistenceError>;
}

/// One page of hydrated posts plus the filtered total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPage {
    /// The page of posts in requested order.
    pub items: Vec<HydratedPost>,
    /// Total matching rows across all pages.
    pub total: u64,
}

/// Persistence port for feedback posts.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post owned by the given author and return the stored
    /// record.
    async fn insert(
        &self,
        author_id: UserId,
        draft: &PostDraft,
    ) -> Result<Post, PersistenceError>;

    /// Fetch a bare post by identifier.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PersistenceError>;

    /// Fetch a post hydrated with author, taxonomy and vote count.
    async fn find_hydrated(&self, id: PostId)
    -> Result<Option<HydratedPost>, PersistenceError>;

    /// Fully replace a post's content, returning the fresh record or
    /// `None` when the post no longer exists.
    async fn replace(
        &self,
        id: PostId,
        draft: &PostDraft,
    ) -> Result<Option<Post>, PersistenceError>;

    /// Delete a post; its votes cascade in the store. Returns whether a
    /// row was removed.
    async fn delete(&self, id: PostId) -> Result<bool, PersistenceError>;

    /// List hydrated posts for one page of the filtered, sorted result
    /// set, together with the filtered total.
    async fn list(
        &self,
        filter: ListFilter,
        sort: SortKey,
        page: PageRequest,
    ) -> Result<PostPage, PersistenceError>;
}

/// Persistence port for vote rows.
///
/// The store's unique `(user, post)` constraint is the concurrency-control
/// mechanism: implementations must make `insert_if_absent` race-safe by
/// riding on that constraint rather than checking first.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Insert the vote unless it already exists. Returns whether a row was
    /// inserted; a concurrent duplicate resolves to `false`, never an
    /// error.
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<bool, PersistenceError>;

    /// Remove the vote if present. Returns whether a row was removed.
    async fn remove(&self, user_id: UserId, post_id: PostId)
    -> Result<bool, PersistenceError>;

    /// Of the given posts, the ids the user has voted on.
    async fn voted_post_ids(
        &self,
        user_id: UserId,
        post_ids: &[PostId],
    ) -> Result<Vec<PostId>, PersistenceError>;
}

/// Persistence port for category and status reference data.
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// All categories ordered by id.
    async fn categories(&self) -> Result<Vec<Category>, PersistenceError>;

    /// All statuses ordered by id.
    async fn statuses(&self) -> Result<Vec<Status>, PersistenceError>;

    /// Fetch a category by identifier.
    async fn find_category(&self, id: CategoryId)
    -> Result<Option<Category>, PersistenceError>;

    /// Fetch a status by identifier.
    async fn find_status(&self, id: StatusId) -> Result<Option<Status>, PersistenceError>;

    /// Insert a category, failing with [`PersistenceError::Conflict`] when
    /// the name is taken.
    async fn insert_category(
        &self,
        name: &CategoryName,
    ) -> Result<Category, PersistenceError>;
}

/// Port for one-way password hashing.
///
/// Hashing is CPU-bound; implementations must not block the async runtime.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a raw password for storage.
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Verify a raw password against a stored hash.
    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError>;
}

/// Port for issuing and verifying stateless access tokens.
///
/// Verification is a pure signature + expiry check so any instance can
/// validate any request without shared server-side session state.
pub trait TokenCodec: Send + Sync {
    /// Sign a fresh token for the given claims.
    fn issue(&self, claims: &TokenClaims) -> Result<AccessToken, TokenError>;

    /// Verify an encoded token and recover its claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}

/// Driving port for account registration, login and profile management.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account and issue its first token.
    async fn register(
        &self,
        registration: Registration,
    ) -> Result<AuthenticatedAccount, DomainError>;

    /// Authenticate credentials and issue a token.
    async fn login(
        &self,
        credentials: Credentials,
    ) -> Result<AuthenticatedAccount, DomainError>;

    /// Fetch the caller's own profile.
    async fn profile(&self, user_id: UserId) -> Result<User, DomainError>;

    /// Apply a partial profile update.
    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<User, DomainError>;

    /// Permanently delete the caller's account.
    async fn delete_account(&self, user_id: UserId) -> Result<(), DomainError>;
}

/// Driving port for the feedback board.
#[async_trait]
pub trait FeedbackService: Send + Sync {
    /// One page of the filtered, sorted feedback list.
    async fn list(
        &self,
        query: FeedbackListQuery,
        requester: Option<UserId>,
    ) -> Result<FeedbackPage, DomainError>;

    /// Create a post owned by the requester.
    async fn create(
        &self,
        author_id: UserId,
        draft: PostDraft,
    ) -> Result<FeedbackItem, DomainError>;

    /// Fully replace a post's content; only the author may do this.
    async fn update(
        &self,
        requester: UserId,
        post_id: PostId,
        draft: PostDraft,
    ) -> Result<FeedbackItem, DomainError>;

    /// Delete a post; only the author may do this.
    async fn delete(&self, requester: UserId, post_id: PostId) -> Result<(), DomainError>;

    /// Toggle the requester's vote on a post.
    async fn toggle_vote(
        &self,
        requester: UserId,
        post_id: PostId,
    ) -> Result<VoteOutcome, DomainError>;
}

/// Driving port for taxonomy reads and category creation.
#[async_trait]
pub trait TaxonomyService: Send + Sync {
    /// All categories ordered by id.
    async fn categories(&self) -> Result<Vec<Category>, DomainError>;

    /// All statuses ordered by id.
    async fn statuses(&self) -> Result<Vec<Status>, DomainError>;

    /// Create a category with a unique name.
    async fn create_category(&self, name: CategoryName) -> Result<Category, DomainError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(PersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(PersistenceError::query("syntax"), ErrorCode::InternalError)]
    #[case(PersistenceError::conflict("duplicate key"), ErrorCode::InternalError)]
    fn persistence_errors_map_to_domain_codes(
        #[case] error: PersistenceError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_persistence_error(error).code(), expected);
    }

    #[rstest]
    fn persistence_error_display_includes_message() {
        let error = PersistenceError::conflict("users_email_key");
        assert!(error.to_string().contains("users_email_key"));
    }
}
