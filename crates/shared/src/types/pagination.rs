//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Checks that both page and limit are at least 1.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` otherwise.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.page == 0 {
            return Err(AppError::Validation("page must be at least 1".into()));
        }
        if self.limit == 0 {
            return Err(AppError::Validation("limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }

    /// Builds response metadata for `total_items` rows.
    #[must_use]
    pub fn meta(&self, total_items: u64) -> PageMeta {
        PageMeta::new(self.page, self.limit, total_items)
    }
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages; zero when there are no items.
    pub total_pages: u64,
}

impl PageMeta {
    /// Computes metadata, with `total_pages = ceil(total_items / limit)`.
    #[must_use]
    pub fn new(page: u32, limit: u32, total_items: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total_items.div_ceil(u64::from(limit))
        };

        Self {
            page,
            limit,
            total_items,
            total_pages,
        }
    }
}
