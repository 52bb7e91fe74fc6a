//! Page-number pagination primitives shared by backend list endpoints.
//!
//! List endpoints accept a 1-based page number and a bounded page size,
//! both optional with documented defaults, and answer with an envelope of
//! `{total, pages, currentPage}`. This crate owns the validation and the
//! arithmetic so every endpoint paginates identically.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default page number when the caller omits one.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size when the caller omits one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound on the page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validation failures raised when constructing pagination inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Page numbers are 1-based; zero is not addressable.
    #[error("page number must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("page size must be at least 1")]
    ZeroSize,
    /// Requested size exceeds the configured ceiling.
    #[error("page size must be at most {max}")]
    SizeTooLarge {
        /// The ceiling that was exceeded.
        max: u32,
    },
}

/// Validated 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageNumber(u32);

impl PageNumber {
    /// Validate and construct a page number.
    ///
    /// # Errors
    /// Returns [`PaginationError::ZeroPage`] for page zero.
    pub const fn new(page: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        Ok(Self(page))
    }

    /// The underlying 1-based page number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self(DEFAULT_PAGE)
    }
}

impl TryFrom<u32> for PageNumber {
    type Error = PaginationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageNumber> for u32 {
    fn from(value: PageNumber) -> Self {
        value.0
    }
}

/// Validated page size bounded by [`MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    /// Validate and construct a page size.
    ///
    /// # Errors
    /// Returns [`PaginationError::ZeroSize`] for zero and
    /// [`PaginationError::SizeTooLarge`] above [`MAX_PAGE_SIZE`].
    pub const fn new(size: u32) -> Result<Self, PaginationError> {
        if size == 0 {
            return Err(PaginationError::ZeroSize);
        }
        if size > MAX_PAGE_SIZE {
            return Err(PaginationError::SizeTooLarge { max: MAX_PAGE_SIZE });
        }
        Ok(Self(size))
    }

    /// The underlying page size.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

impl TryFrom<u32> for PageSize {
    type Error = PaginationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.0
    }
}

/// A validated page request combining page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    page: PageNumber,
    size: PageSize,
}

impl PageRequest {
    /// Combine a page number and size into a request.
    #[must_use]
    pub const fn new(page: PageNumber, size: PageSize) -> Self {
        Self { page, size }
    }

    /// Build a request from optional raw query values, applying defaults.
    ///
    /// # Errors
    /// Propagates the newtype validation failures.
    pub fn from_raw(page: Option<u32>, size: Option<u32>) -> Result<Self, PaginationError> {
        let page = page.map_or_else(|| Ok(PageNumber::default()), PageNumber::new)?;
        let size = size.map_or_else(|| Ok(PageSize::default()), PageSize::new)?;
        Ok(Self { page, size })
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(self) -> PageNumber {
        self.page
    }

    /// The page size.
    #[must_use]
    pub const fn size(self) -> PageSize {
        self.size
    }

    /// Number of rows to skip for this page, suitable for an SQL `OFFSET`.
    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.page.get() - 1) * i64::from(self.size.get())
    }

    /// Number of rows to fetch, suitable for an SQL `LIMIT`.
    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.size.get())
    }
}

/// Pagination envelope accompanying a page of results.
///
/// Serialises as `{"total": …, "pages": …, "currentPage": …}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Total number of matching items across all pages.
    pub total: u64,
    /// Number of pages at the requested page size.
    pub pages: u64,
    /// The 1-based page this envelope describes.
    pub current_page: u32,
}

impl Pagination {
    /// Derive the envelope for a total row count and the request that
    /// produced it.
    #[must_use]
    pub fn for_total(total: u64, request: PageRequest) -> Self {
        Self {
            total,
            pages: total.div_ceil(u64::from(request.size().get())),
            current_page: request.page().get(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this crate.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn page_number_rejects_zero() {
        let err = PageNumber::new(0).expect_err("page zero must fail");
        assert_eq!(err, PaginationError::ZeroPage);
    }

    #[rstest]
    #[case(0, PaginationError::ZeroSize)]
    #[case(MAX_PAGE_SIZE + 1, PaginationError::SizeTooLarge { max: MAX_PAGE_SIZE })]
    fn page_size_rejects_out_of_range(#[case] size: u32, #[case] expected: PaginationError) {
        let err = PageSize::new(size).expect_err("out of range size must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn defaults_match_documented_values() {
        let request = PageRequest::default();
        assert_eq!(request.page().get(), DEFAULT_PAGE);
        assert_eq!(request.size().get(), DEFAULT_PAGE_SIZE);
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), 10);
    }

    #[rstest]
    #[case(Some(2), Some(10), 10, 10)]
    #[case(Some(3), Some(25), 50, 25)]
    #[case(None, None, 0, 10)]
    fn offset_skips_previous_pages(
        #[case] page: Option<u32>,
        #[case] size: Option<u32>,
        #[case] offset: i64,
        #[case] limit: i64,
    ) {
        let request = PageRequest::from_raw(page, size).expect("valid request");
        assert_eq!(request.offset(), offset);
        assert_eq!(request.limit(), limit);
    }

    #[rstest]
    #[case(15, 1, 10, 2)]
    #[case(15, 2, 10, 2)]
    #[case(0, 1, 10, 0)]
    #[case(10, 1, 10, 1)]
    #[case(11, 1, 10, 2)]
    fn envelope_rounds_pages_up(
        #[case] total: u64,
        #[case] page: u32,
        #[case] size: u32,
        #[case] pages: u64,
    ) {
        let request = PageRequest::from_raw(Some(page), Some(size)).expect("valid request");
        let envelope = Pagination::for_total(total, request);
        assert_eq!(envelope.total, total);
        assert_eq!(envelope.pages, pages);
        assert_eq!(envelope.current_page, page);
    }

    #[rstest]
    fn envelope_serialises_camel_case() {
        let request = PageRequest::from_raw(Some(2), Some(10)).expect("valid request");
        let envelope = Pagination::for_total(15, request);
        let value = serde_json::to_value(envelope).expect("serialise envelope");
        assert_eq!(
            value,
            serde_json::json!({ "total": 15, "pages": 2, "currentPage": 2 })
        );
    }
}
