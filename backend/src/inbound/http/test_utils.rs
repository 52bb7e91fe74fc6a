//! Shared fixtures for HTTP handler tests.
//!
//! Handler tests exercise routing, status codes and JSON shapes over stub
//! service implementations; repository-level behaviour is covered by the
//! domain service tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{
    AccountService, FeedbackService, TaxonomyService, TokenCodec, TokenError,
};
use crate::domain::{
    AccessToken, AuthenticatedAccount, Category, CategoryName, Credentials, EmailAddress,
    Error, FeedbackItem, FeedbackListQuery, FeedbackPage, PostDraft, PostId,
    ProfileChanges, Registration, Status, TokenClaims, User, UserId, VoteOutcome,
};

use super::state::HttpState;

/// Token codec accepting `user-<id>` tokens; issuance mirrors the format.
pub(crate) struct StubTokens;

impl TokenCodec for StubTokens {
    fn issue(&self, claims: &TokenClaims) -> Result<AccessToken, TokenError> {
        Ok(AccessToken::new(format!("user-{}", claims.user_id.get())))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let id = token
            .strip_prefix("user-")
            .ok_or(TokenError::Invalid)?
            .parse::<i32>()
            .map_err(|_| TokenError::Invalid)?;
        Ok(TokenClaims {
            user_id: UserId::new(id),
            email: fixture_email(),
        })
    }
}

pub(crate) fn fixture_email() -> EmailAddress {
    EmailAddress::new("a@x.com").expect("valid fixture email")
}

pub(crate) fn fixture_user(id: i32, email: &str) -> User {
    let now = Utc::now();
    User::new(
        UserId::new(id),
        EmailAddress::new(email).expect("valid fixture email"),
        None,
        None,
        now,
        now,
    )
}

/// Account service that always reports an internal error; tests that never
/// reach it can share one instance.
pub(crate) struct UnusedAccounts;

#[async_trait]
impl AccountService for UnusedAccounts {
    async fn register(&self, _: Registration) -> Result<AuthenticatedAccount, Error> {
        Err(Error::internal("unused stub called"))
    }

    async fn login(&self, _: Credentials) -> Result<AuthenticatedAccount, Error> {
        Err(Error::internal("unused stub called"))
    }

    async fn profile(&self, _: UserId) -> Result<User, Error> {
        Err(Error::internal("unused stub called"))
    }

    async fn update_profile(&self, _: UserId, _: ProfileChanges) -> Result<User, Error> {
        Err(Error::internal("unused stub called"))
    }

    async fn delete_account(&self, _: UserId) -> Result<(), Error> {
        Err(Error::internal("unused stub called"))
    }
}

/// Feedback service twin of [`UnusedAccounts`].
pub(crate) struct UnusedFeedback;

#[async_trait]
impl FeedbackService for UnusedFeedback {
    async fn list(
        &self,
        _: FeedbackListQuery,
        _: Option<UserId>,
    ) -> Result<FeedbackPage, Error> {
        Err(Error::internal("unused stub called"))
    }

    async fn create(&self, _: UserId, _: PostDraft) -> Result<FeedbackItem, Error> {
        Err(Error::internal("unused stub called"))
    }

    async fn update(
        &self,
        _: UserId,
        _: PostId,
        _: PostDraft,
    ) -> Result<FeedbackItem, Error> {
        Err(Error::internal("unused stub called"))
    }

    async fn delete(&self, _: UserId, _: PostId) -> Result<(), Error> {
        Err(Error::internal("unused stub called"))
    }

    async fn toggle_vote(&self, _: UserId, _: PostId) -> Result<VoteOutcome, Error> {
        Err(Error::internal("unused stub called"))
    }
}

/// Taxonomy service twin of [`UnusedAccounts`].
pub(crate) struct UnusedTaxonomy;

#[async_trait]
impl TaxonomyService for UnusedTaxonomy {
    async fn categories(&self) -> Result<Vec<Category>, Error> {
        Err(Error::internal("unused stub called"))
    }

    async fn statuses(&self) -> Result<Vec<Status>, Error> {
        Err(Error::internal("unused stub called"))
    }

    async fn create_category(&self, _: CategoryName) -> Result<Category, Error> {
        Err(Error::internal("unused stub called"))
    }
}

/// Assemble handler state from whichever real stubs a test supplies.
pub(crate) fn test_state(
    accounts: Arc<dyn AccountService>,
    feedback: Arc<dyn FeedbackService>,
    taxonomy: Arc<dyn TaxonomyService>,
) -> actix_web::web::Data<HttpState> {
    actix_web::web::Data::new(HttpState::new(
        accounts,
        feedback,
        taxonomy,
        Arc::new(StubTokens),
    ))
}
