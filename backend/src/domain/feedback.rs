//! Feedback post model: posts, list queries, and vote outcomes.
//!
//! A post references one author, one category and one status. Vote counts
//! and the per-viewer vote flag are derived attributes computed at read
//! time; they never live on the post itself.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use pagination::{PageRequest, Pagination};
use serde::{Deserialize, Serialize};

use super::taxonomy::{Category, CategoryId, Status, StatusId};
use super::user::{DisplayName, EmailAddress, UserId};

/// Validation errors returned by the post newtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    /// Title was blank once trimmed.
    EmptyTitle,
    /// Title exceeds the accepted length.
    TitleTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
    /// Description was blank once trimmed.
    EmptyDescription,
    /// Requested sort key is not recognised.
    UnknownSortKey,
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => {
                write!(f, "title must be at most {max} characters")
            }
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::UnknownSortKey => {
                write!(f, "sortBy must be one of createdAt, votes")
            }
        }
    }
}

impl std::error::Error for PostValidationError {}

/// Stable numeric post identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i32);

impl PostId {
    /// Wrap a raw identifier from the store.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// The raw numeric identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum allowed length for a post title.
pub const TITLE_MAX: usize = 200;

/// Validated, trimmed post title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostTitle(String);

impl PostTitle {
    /// Validate and construct a title.
    pub fn new(title: impl Into<String>) -> Result<Self, PostValidationError> {
        Self::from_owned(title.into())
    }

    fn from_owned(title: String) -> Result<Self, PostValidationError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(PostValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PostTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PostTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PostTitle> for String {
    fn from(value: PostTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostTitle {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Validated, non-blank post description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostDescription(String);

impl PostDescription {
    /// Validate and construct a description.
    pub fn new(description: impl Into<String>) -> Result<Self, PostValidationError> {
        Self::from_owned(description.into())
    }

    fn from_owned(description: String) -> Result<Self, PostValidationError> {
        if description.trim().is_empty() {
            return Err(PostValidationError::EmptyDescription);
        }
        Ok(Self(description))
    }
}

impl AsRef<str> for PostDescription {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PostDescription> for String {
    fn from(value: PostDescription) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostDescription {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// A stored feedback post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Stable identifier.
    pub id: PostId,
    /// Short summary line.
    pub title: PostTitle,
    /// Full description body.
    pub description: PostDescription,
    /// Author owning this post.
    pub author_id: UserId,
    /// Classifying category.
    pub category_id: CategoryId,
    /// Workflow status.
    pub status_id: StatusId,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated content for creating or fully replacing a post.
///
/// Update is a full replace per the API contract, so create and update
/// share this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    /// Short summary line.
    pub title: PostTitle,
    /// Full description body.
    pub description: PostDescription,
    /// Classifying category; must resolve to an existing row.
    pub category_id: CategoryId,
    /// Workflow status; must resolve to an existing row.
    pub status_id: StatusId,
}

/// Optional equality filters applied to the feedback list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListFilter {
    /// Restrict to a single category.
    pub category_id: Option<CategoryId>,
    /// Restrict to a single status.
    pub status_id: Option<StatusId>,
}

/// Sort order for the feedback list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most recently created first; ties break on descending id.
    #[default]
    Recent,
    /// Highest vote count first; ties break on ascending id
    /// (insertion order).
    Votes,
}

impl FromStr for SortKey {
    type Err = PostValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::Recent),
            "votes" => Ok(Self::Votes),
            _ => Err(PostValidationError::UnknownSortKey),
        }
    }
}

/// Complete, validated feedback list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedbackListQuery {
    /// Equality filters.
    pub filter: ListFilter,
    /// Sort order.
    pub sort: SortKey,
    /// Page selection.
    pub page: PageRequest,
}

/// Author details embedded in a hydrated feedback item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSummary {
    /// Author's user id.
    pub id: UserId,
    /// Author's email address.
    pub email: EmailAddress,
    /// Author's display name, when set.
    pub display_name: Option<DisplayName>,
    /// Author's avatar reference, when set.
    pub avatar: Option<String>,
}

/// A post hydrated with author, category, status and its vote count.
///
/// This is the repository's read model; the viewer-specific vote flag is
/// layered on by the service as [`FeedbackItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydratedPost {
    /// The stored post.
    pub post: Post,
    /// Author details.
    pub author: AuthorSummary,
    /// Resolved category.
    pub category: Category,
    /// Resolved status.
    pub status: Status,
    /// Number of votes currently on the post.
    pub vote_count: u64,
}

/// A hydrated post plus the requesting viewer's vote flag.
///
/// `has_voted` is always present and defaults to `false` for anonymous
/// viewers; it is never omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackItem {
    /// The hydrated post.
    pub entry: HydratedPost,
    /// Whether the requesting user has voted on this post.
    pub has_voted: bool,
}

/// One page of feedback items with its pagination envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackPage {
    /// The page of items in requested order.
    pub items: Vec<FeedbackItem>,
    /// Totals for the filtered result set.
    pub pagination: Pagination,
}

/// Result of a vote toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    /// Whether the caller's vote exists after the toggle.
    pub voted: bool,
}
