//! This module defines the common functionality for paging the expense list.

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of expenses to display per page when not specified in a
    /// request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
        }
    }
}

/// Convert a 1-based page number and page size into a row offset.
///
/// A page number of zero is treated as the first page.
pub fn page_offset(page_number: u64, page_size: u64) -> u64 {
    page_number.saturating_sub(1) * page_size
}

/// The number of pages needed to display `total` rows, at least one.
pub fn page_count(total: u64, page_size: u64) -> u64 {
    if total == 0 {
        1
    } else {
        total.div_ceil(page_size)
    }
}
