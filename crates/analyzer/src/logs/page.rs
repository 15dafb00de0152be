//! Page — 1-based pagination with clamping.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Requested page window; out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total_entries: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Slice `items` into the requested page. `max_page_size` caps the
    /// page size; a zero page size falls back to 1.
    pub fn apply<T: Clone>(&self, items: &[T], max_page_size: usize) -> Page<T> {
        let page_size = self.page_size.clamp(1, max_page_size.max(1));
        let total_entries = items.len();
        let total_pages = total_entries.div_ceil(page_size).max(1);
        let page = self.page.clamp(1, total_pages);

        let start = ((page - 1) * page_size).min(total_entries);
        let end = (start + page_size).min(total_entries);

        Page {
            items: items[start..end].to_vec(),
            pagination: Pagination {
                page,
                page_size,
                total_entries,
                total_pages,
                has_next: page < total_pages,
                has_prev: page > 1,
            },
        }
    }
}
