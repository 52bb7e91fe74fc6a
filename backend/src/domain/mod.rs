//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define the strongly typed feedback-board model used by the
//! inbound HTTP adapter and the outbound persistence/auth adapters. Types
//! are immutable; invariants and serialisation contracts live in each
//! type's Rustdoc. Ports describe the edges of the hexagon; the service
//! implementations here contain every business rule the API exposes.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod feedback;
pub mod feedback_service;
pub mod ports;
pub mod taxonomy;
pub mod taxonomy_service;
pub mod user;

pub use self::account_service::AccountServiceImpl;
pub use self::auth::{
    AccessToken, AuthenticatedAccount, CredentialValidationError, Credentials,
    ProfileChanges, Registration, TokenClaims,
};
pub use self::error::{Error, ErrorCode};
pub use self::feedback::{
    AuthorSummary, FeedbackItem, FeedbackListQuery, FeedbackPage, HydratedPost,
    ListFilter, Post, PostDescription, PostDraft, PostId, PostTitle,
    PostValidationError, SortKey, VoteOutcome,
};
pub use self::feedback_service::FeedbackServiceImpl;
pub use self::taxonomy::{
    Category, CategoryId, CategoryName, Status, StatusId, TaxonomyValidationError,
};
pub use self::taxonomy_service::TaxonomyServiceImpl;
pub use self::user::{
    DisplayName, EmailAddress, NewUser, PasswordHash, User, UserAccount, UserChanges,
    UserId, UserValidationError,
};

/// Convenient domain result alias.
pub type DomainResult<T> = Result<T, Error>;
