//! Paging types for list endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult};

/// Paging query parameters shared by every list endpoint.
///
/// `page` is a raw row offset handed straight to `OFFSET`; it is *not*
/// multiplied by `count`. That matches the long-standing behavior of the
/// public API, so callers paging block-by-block must advance `page` by
/// `count` themselves.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PageParams {
    /// Row offset into the ordered result set (zero-based)
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of rows to return
    #[serde(default = "default_count")]
    pub count: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_count() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PageParams {
    /// Check the paging preconditions (`page >= 0`, `count > 0`).
    pub fn validate(&self) -> AppResult<()> {
        if self.count == 0 {
            return Err(AppError::validation(
                "invalid paging (page >= 0 and count > 0)",
            ));
        }
        Ok(())
    }

    /// Offset for the storage query.
    pub fn offset(&self) -> u64 {
        self.page
    }

    /// Limit for the storage query, capped to keep queries bounded.
    pub fn limit(&self) -> u64 {
        self.count.min(MAX_PAGE_SIZE)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            count: DEFAULT_PAGE_SIZE,
        }
    }
}
