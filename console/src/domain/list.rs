//! Search box plus pagination over a list fetched once.

use pagination::{PageButton, PageSize, paginate};

use super::search::{Searchable, filter};

/// Rows and controls for the visible page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage<T> {
    /// Rows on this page.
    pub rows: Vec<T>,
    /// 1-based page number after clamping.
    pub number: usize,
    /// Pages in the filtered list.
    pub total_pages: usize,
    /// Rows in the filtered list.
    pub total_items: usize,
    /// Page button row; empty when controls are hidden.
    pub buttons: Vec<PageButton>,
    /// Whether previous/next and page buttons render.
    pub show_controls: bool,
    /// Single empty-state row, shown instead of data rows.
    pub empty_message: Option<String>,
}

/// Empty-state text, quoting the search even when it is blank.
pub fn no_results_message(search: &str) -> String {
    format!("No results found for '{search}'")
}

/// Client-side list state: all rows, the search text and the current page.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    items: Vec<T>,
    search: String,
    page: usize,
    page_size: PageSize,
}

impl<T> ListState<T>
where
    T: Searchable + Clone,
{
    /// Empty list on page 1.
    pub fn new(page_size: PageSize) -> Self {
        Self {
            items: Vec::new(),
            search: String::new(),
            page: 1,
            page_size,
        }
    }

    /// Replace the rows, keeping the search and page.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Every row, unfiltered.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Current search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Change the search text and return to page 1.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    /// Jump to a page; out-of-range numbers clamp when rendered.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Rows matching the search.
    pub fn filtered(&self) -> Vec<T> {
        filter(&self.items, &self.search)
    }

    /// The visible page of the filtered rows.
    pub fn page(&self) -> ListPage<T> {
        let filtered = self.filtered();
        let page = paginate(&filtered, self.page_size, self.page);
        let show_controls = page.show_controls();
        ListPage {
            rows: page.items().to_vec(),
            number: page.number(),
            total_pages: page.total_pages(),
            total_items: page.total_items(),
            buttons: if show_controls { page.buttons() } else { Vec::new() },
            show_controls,
            empty_message: page.is_empty().then(|| no_results_message(&self.search)),
        }
    }
}
