//! Page-based pagination primitives shared by list endpoints.
//!
//! A [`PageRequest`] is the validated `(page, limit)` pair parsed from a query
//! string. A [`Page`] is the envelope returned by repositories: one window of
//! items plus the total record count and the derived page count.
//!
//! Pages are 1-based. For `N` records and a limit of `P`, there are
//! `ceil(N / P)` pages, and concatenating every page yields each record
//! exactly once provided the underlying ordering is total.
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(2, 3).expect("valid request");
//! let page = Page::from_all((1..=7).collect::<Vec<u32>>(), request);
//! assert_eq!(page.items(), &[4, 5, 6]);
//! assert_eq!(page.total(), 7);
//! assert_eq!(page.page_count(), 3);
//! ```

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Limit applied when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest limit a caller may request.
pub const MAX_LIMIT: u32 = 100;

/// Validation failures raised by [`PageRequest`] constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Pages are 1-based; zero is rejected.
    #[error("page must be at least 1")]
    ZeroPage,
    /// Limit was zero or larger than [`MAX_LIMIT`].
    #[error("limit must be between 1 and {max}")]
    LimitOutOfRange {
        /// Upper bound accepted for the limit.
        max: u32,
    },
}

/// Validated page position and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a request for the given 1-based page and limit.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::ZeroPage`] when `page` is zero and
    /// [`PageRequestError::LimitOutOfRange`] when `limit` is zero or above
    /// [`MAX_LIMIT`].
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PageRequestError::LimitOutOfRange { max: MAX_LIMIT });
        }
        Ok(Self { page, limit })
    }

    /// Build a request from optional query parameters, applying defaults.
    ///
    /// # Errors
    ///
    /// Propagates the validation failures of [`PageRequest::new`].
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageRequestError> {
        Self::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_LIMIT))
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Index range of this page within a collection of `total` items.
    ///
    /// Pages past the end yield an empty range.
    #[must_use]
    pub fn window(self, total: usize) -> Range<usize> {
        let start = usize::try_from(self.offset()).map_or(total, |offset| offset.min(total));
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let end = start.saturating_add(limit).min(total);
        start..end
    }
}

/// Number of pages needed to hold `total` items at `limit` items per page.
///
/// ```
/// assert_eq!(pagination::page_count(0, 10), 0);
/// assert_eq!(pagination::page_count(10, 10), 1);
/// assert_eq!(pagination::page_count(11, 10), 2);
/// ```
#[must_use]
pub fn page_count(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

/// One page of results plus the totals needed to render pagination controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    page: u32,
    page_count: u64,
}

impl<T> Page<T> {
    /// Wrap an already-windowed set of items.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            page_count: page_count(total, request.limit()),
        }
    }

    /// Cut the requested window out of a fully materialised, ordered
    /// collection.
    #[must_use]
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let window = request.window(total);
        let items = all
            .into_iter()
            .skip(window.start)
            .take(window.len())
            .collect();
        Self::new(items, u64::try_from(total).unwrap_or(u64::MAX), request)
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Total number of records across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// The 1-based page number this envelope holds.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of pages available.
    #[must_use]
    pub const fn page_count(&self) -> u64 {
        self.page_count
    }

    /// Transform each item while keeping the totals.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_count: self.page_count,
        }
    }
}
