//! Page selection for list endpoints.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// A page request: 1-based page number and page size.
///
/// # Example
///
/// ```
/// use trakt_rs::Pagination;
///
/// let page = Pagination::new(1, 100).unwrap();
/// assert_eq!(
///     serde_json::Value::Object(page.value()),
///     serde_json::json!({"page": 1, "limit": 100})
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    /// Default page size used by list operations.
    pub const DEFAULT_LIMIT: u32 = 100;

    /// Create a page request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `page` or `limit` is zero.
    pub fn new(page: u32, limit: u32) -> Result<Self> {
        if page == 0 || limit == 0 {
            return Err(Error::InvalidInput(format!(
                "pagination needs page >= 1 and limit >= 1, got page={} limit={}",
                page, limit
            )));
        }
        Ok(Self { page, limit })
    }

    /// First page with the given size. A zero limit is clamped to 1.
    pub fn first(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
        }
    }

    /// Page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// The following page with the same size.
    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            limit: self.limit,
        }
    }

    /// Query parameters for this page.
    pub fn value(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("page".to_string(), Value::from(self.page));
        map.insert("limit".to_string(), Value::from(self.limit));
        map
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first(Self::DEFAULT_LIMIT)
    }
}
