//! Category and status reference data.
//!
//! Posts are classified by exactly one category and one status. Both lists
//! are read-mostly lookup tables seeded by migration; only category creation
//! is exposed as an operation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by the taxonomy newtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyValidationError {
    /// Category name was blank once trimmed.
    EmptyName,
    /// Category name exceeds the accepted length.
    NameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
}

impl fmt::Display for TaxonomyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for TaxonomyValidationError {}

/// Stable numeric category identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i32);

impl CategoryId {
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

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable numeric status identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(i32);

impl StatusId {
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

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum allowed length for a category name.
pub const CATEGORY_NAME_MAX: usize = 64;

/// Validated category name, unique within the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Validate and construct a category name.
    pub fn new(name: impl Into<String>) -> Result<Self, TaxonomyValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, TaxonomyValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TaxonomyValidationError::EmptyName);
        }
        if trimmed.chars().count() > CATEGORY_NAME_MAX {
            return Err(TaxonomyValidationError::NameTooLong {
                max: CATEGORY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CategoryName> for String {
    fn from(value: CategoryName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CategoryName {
    type Error = TaxonomyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// A feedback category, e.g. "Bug" or "Feature".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Stable identifier.
    pub id: CategoryId,
    /// Unique human-readable name.
    pub name: String,
}

/// A workflow status, e.g. "Planned" or "Done".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Stable identifier.
    pub id: StatusId,
    /// Unique human-readable name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn category_name_rejects_blank(#[case] raw: &str) {
        let err = CategoryName::new(raw).expect_err("blank name must fail");
        assert_eq!(err, TaxonomyValidationError::EmptyName);
    }

    #[rstest]
    fn category_name_rejects_overlong_input() {
        let raw = "x".repeat(CATEGORY_NAME_MAX + 1);
        let err = CategoryName::new(raw).expect_err("overlong name must fail");
        assert_eq!(
            err,
            TaxonomyValidationError::NameTooLong {
                max: CATEGORY_NAME_MAX
            }
        );
    }

    #[rstest]
    fn category_name_trims_whitespace() {
        let name = CategoryName::new("  Performance  ").expect("valid name");
        assert_eq!(name.as_ref(), "Performance");
    }
}
