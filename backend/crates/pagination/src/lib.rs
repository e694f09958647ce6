//! Page-number pagination primitives.
//!
//! Listing endpoints accept a 1-based page number and a requested page size.
//! The size is clamped to an endpoint-specific maximum, and pages past the
//! end of a result set resolve to an empty page rather than an error.
//!
//! ```
//! use pagination::{PageNumber, PageSize, PageWindow};
//!
//! let size = PageSize::clamped(50, 10).expect("positive size");
//! let window = PageWindow::new(size, PageNumber::new(2));
//! let items: Vec<u32> = (1..=25).collect();
//! assert_eq!(window.slice(&items), &[11, 12, 13, 14, 15, 16, 17, 18, 19, 20]);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used when a request does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 2;
/// Largest page size a listing endpoint will serve.
pub const MAX_PAGE_SIZE: u32 = 10;
/// Page served when a request does not name one.
pub const DEFAULT_PAGE: i64 = 1;

/// Errors raised while building pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Requested page size was zero or negative.
    #[error("page size must be at least 1 (got {requested})")]
    InvalidPageSize {
        /// Page size as submitted.
        requested: i64,
    },
}

/// Effective page size after clamping.
///
/// ## Invariants
/// - `1 <= value <= max` for the maximum supplied at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSize(u32);

impl PageSize {
    /// Clamp a requested page size to `max`.
    ///
    /// # Errors
    /// Returns [`PaginationError::InvalidPageSize`] when `requested < 1`.
    pub fn clamped(requested: i64, max: u32) -> Result<Self, PaginationError> {
        if requested < 1 {
            return Err(PaginationError::InvalidPageSize { requested });
        }
        let bounded = u32::try_from(requested).map_or(max, |size| size.min(max));
        Ok(Self(bounded.max(1)))
    }

    /// Number of items on a full page.
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

/// 1-based page number as supplied by the caller.
///
/// Numbers below 1 are accepted and address an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageNumber(i64);

impl PageNumber {
    /// Wrap a raw page number.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw page number.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self(DEFAULT_PAGE)
    }
}

/// Offset/limit window addressed by a page size and page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageWindow {
    offset: u64,
    limit: u32,
    addressable: bool,
}

impl PageWindow {
    /// Compute the window for `number` with pages of `size` items.
    #[must_use]
    pub fn new(size: PageSize, number: PageNumber) -> Self {
        let limit = size.get();
        let offset = u64::try_from(number.get().saturating_sub(1))
            .ok()
            .and_then(|index| index.checked_mul(u64::from(limit)));
        match offset {
            Some(offset) if number.get() >= 1 => Self {
                offset,
                limit,
                addressable: true,
            },
            _ => Self {
                offset: 0,
                limit,
                addressable: false,
            },
        }
    }

    /// Index of the first item on the page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// `false` when the page number can never hold items (below 1 or
    /// overflowing the offset range).
    #[must_use]
    pub const fn is_addressable(&self) -> bool {
        self.addressable
    }

    /// Select the items on this page, or an empty slice past the end.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        if !self.addressable {
            return &[];
        }
        let Ok(start) = usize::try_from(self.offset) else {
            return &[];
        };
        let Ok(limit) = usize::try_from(self.limit) else {
            return &[];
        };
        let end = start.saturating_add(limit).min(items.len());
        items.get(start..end).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page window arithmetic.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(10, 10)]
    #[case(11, 10)]
    #[case(500, 10)]
    #[case(i64::MAX, 10)]
    fn page_size_clamps_to_maximum(#[case] requested: i64, #[case] expected: u32) {
        let size = PageSize::clamped(requested, MAX_PAGE_SIZE).expect("positive size");
        assert_eq!(size.get(), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn page_size_rejects_non_positive(#[case] requested: i64) {
        let err = PageSize::clamped(requested, MAX_PAGE_SIZE).expect_err("must fail");
        assert_eq!(err, PaginationError::InvalidPageSize { requested });
    }

    #[rstest]
    fn defaults_match_listing_contract() {
        assert_eq!(PageSize::default().get(), 2);
        assert_eq!(PageNumber::default().get(), 1);
    }

    #[rstest]
    #[case(1, vec![1, 2])]
    #[case(2, vec![3, 4])]
    #[case(3, vec![5])]
    #[case(4, vec![])]
    #[case(0, vec![])]
    #[case(-1, vec![])]
    fn slice_selects_requested_page(#[case] page: i64, #[case] expected: Vec<u8>) {
        let items = [1_u8, 2, 3, 4, 5];
        let window = PageWindow::new(PageSize::default(), PageNumber::new(page));
        assert_eq!(window.slice(&items), expected.as_slice());
    }

    #[rstest]
    fn huge_page_numbers_are_empty_rather_than_overflowing() {
        let size = PageSize::clamped(10, MAX_PAGE_SIZE).expect("positive size");
        let window = PageWindow::new(size, PageNumber::new(i64::MAX));
        assert!(window.slice(&[1, 2, 3]).is_empty());
    }

    #[rstest]
    fn window_reports_offset_and_limit() {
        let size = PageSize::clamped(3, MAX_PAGE_SIZE).expect("positive size");
        let window = PageWindow::new(size, PageNumber::new(4));
        assert_eq!(window.offset(), 9);
        assert_eq!(window.limit(), 3);
        assert!(window.is_addressable());
    }

    #[rstest]
    fn first_page_of_empty_collection_is_empty() {
        let window = PageWindow::new(PageSize::default(), PageNumber::default());
        let items: [u8; 0] = [];
        assert!(window.slice(&items).is_empty());
    }

    #[rstest]
    fn page_size_serialises_transparently() {
        let size = PageSize::clamped(4, MAX_PAGE_SIZE).expect("positive size");
        assert_eq!(serde_json::to_string(&size).expect("serialise"), "4");
    }
}
