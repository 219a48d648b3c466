//! Pagination bookkeeping for the department list.

use crate::models::DepartmentPage;

/// Current position within the paginated department collection.
///
/// The page number is only ever set by explicit navigation or the
/// initial default; totals come exclusively from server responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: u32,
    page_size: u32,
    total_items: u64,
    /// Zero until the first fetch reports totals.
    total_pages: u32,
}

impl Pager {
    /// Start at page 1 with the given fixed page size.
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_items: 0,
            total_pages: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// `(page, limit)` parameters for the next fetch.
    pub fn params(&self) -> (u32, u32) {
        (self.page, self.page_size)
    }

    /// Navigate to page `n`, clamped into `[1, total_pages]` once totals
    /// are known. Returns the page actually selected.
    pub fn go_to_page(&mut self, n: u32) -> u32 {
        let mut target = n.max(1);
        if self.total_pages > 0 {
            target = target.min(self.total_pages);
        }
        self.page = target;
        self.page
    }

    /// Record the totals a fetch reported.
    pub fn apply(&mut self, page: &DepartmentPage) {
        self.total_items = page.total;
        self.total_pages = page.total_pages;
    }

    /// Whether the current page now lies beyond the last reported page.
    /// True after a deletion empties the final page.
    pub fn is_past_end(&self) -> bool {
        self.total_pages > 0 && self.page > self.total_pages
    }
}
