//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::Page;

/// Pagination query parameters for list endpoints.
///
/// Both values are optional; the query service fills in defaults and caps
/// the page size.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page. Defaults to 20.
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Page number that was served.
    pub current_page: u32,
    /// Effective items per page.
    pub page_size: u32,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of items.
    pub total_count: u32,
}

impl<T> From<&Page<T>> for PaginationMeta {
    fn from(page: &Page<T>) -> Self {
        Self {
            current_page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
            total_count: page.total_count,
        }
    }
}
