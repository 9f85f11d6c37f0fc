//! Page slicing and page-button windowing for client-side list views.
//!
//! Directory and connection lists are fetched whole and paginated locally.
//! [`paginate`] slices a (usually filtered) list into fixed-size windows and
//! [`page_buttons`] computes the button row rendered under a table: the first
//! three pages, the current page and the last three pages, with any gap
//! collapsed into a single [`PageButton::Ellipsis`].
//!
//! Page numbers are 1-based throughout.

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of leading and trailing pages that always get a button.
pub const EDGE_PAGES: usize = 3;

/// Page size used when callers do not configure one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Errors raised when constructing pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Page size must be at least one item.
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// Validated, non-zero number of items per page.
///
/// # Examples
/// ```
/// use pagination::PageSize;
///
/// let size = PageSize::new(25).expect("non-zero page size");
/// assert_eq!(size.get(), 25);
/// assert!(PageSize::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    /// Validate and construct a page size.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroPageSize`] when `size` is zero.
    pub fn new(size: usize) -> Result<Self, PaginationError> {
        NonZeroUsize::new(size)
            .map(Self)
            .ok_or(PaginationError::ZeroPageSize)
    }

    /// Number of items per page.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(NonZeroUsize::MIN.saturating_add(DEFAULT_PAGE_SIZE.saturating_sub(1)))
    }
}

impl TryFrom<usize> for PageSize {
    type Error = PaginationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for usize {
    fn from(value: PageSize) -> Self {
        value.get()
    }
}

/// Number of pages needed to show `total_items`; zero for an empty list.
#[must_use]
pub const fn page_count(total_items: usize, page_size: PageSize) -> usize {
    total_items.div_ceil(page_size.get())
}

/// One window of a paginated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    items: &'a [T],
    number: usize,
    total_pages: usize,
    total_items: usize,
}

impl<'a, T> Page<'a, T> {
    /// Items visible on this page.
    #[must_use]
    pub const fn items(&self) -> &'a [T] {
        self.items
    }

    /// 1-based page number after clamping.
    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }

    /// Total number of pages for the underlying list.
    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Length of the underlying list.
    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.total_items
    }

    /// True when the page holds no items, which only happens for empty lists.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether previous/next and page buttons should be rendered at all.
    #[must_use]
    pub const fn show_controls(&self) -> bool {
        self.total_pages > 1
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Button row for this page.
    #[must_use]
    pub fn buttons(&self) -> Vec<PageButton> {
        page_buttons(self.number, self.total_pages)
    }
}

/// Slice `items` into the window for the 1-based `page`.
///
/// Page `0` is treated as the first page and pages beyond the end clamp to
/// the last page, so a shrinking filtered list never strands the view on a
/// blank page.
///
/// # Examples
/// ```
/// use pagination::{paginate, PageSize};
///
/// let rows: Vec<u32> = (1..=12).collect();
/// let size = PageSize::new(5).expect("page size");
/// let page = paginate(&rows, size, 3);
/// assert_eq!(page.items(), &[11, 12]);
/// assert_eq!(page.total_pages(), 3);
/// ```
#[must_use]
pub fn paginate<T>(items: &[T], page_size: PageSize, page: usize) -> Page<'_, T> {
    let total_pages = page_count(items.len(), page_size);
    let number = page.clamp(1, total_pages.max(1));
    let start = number
        .saturating_sub(1)
        .saturating_mul(page_size.get())
        .min(items.len());
    let end = start.saturating_add(page_size.get()).min(items.len());

    Page {
        items: items.get(start..end).unwrap_or_default(),
        number,
        total_pages,
        total_items: items.len(),
    }
}

/// Iterate every page of `items` in order.
pub fn pages<T>(items: &[T], page_size: PageSize) -> impl Iterator<Item = Page<'_, T>> {
    let total_pages = page_count(items.len(), page_size);
    (1..=total_pages).map(move |number| paginate(items, page_size, number))
}

/// One entry in the page-button row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageButton {
    /// A clickable page number.
    Page(usize),
    /// A collapsed run of page numbers.
    Ellipsis,
}

impl fmt::Display for PageButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(number) => write!(f, "{number}"),
            Self::Ellipsis => f.write_str("..."),
        }
    }
}

/// Compute the "first 3 / current / last 3" button row.
///
/// `current` is clamped into `1..=total_pages`. No buttons are produced when
/// there are no pages.
///
/// # Examples
/// ```
/// use pagination::{page_buttons, PageButton};
///
/// let buttons = page_buttons(5, 10);
/// let labels: Vec<String> = buttons.iter().map(ToString::to_string).collect();
/// assert_eq!(labels, ["1", "2", "3", "...", "5", "...", "8", "9", "10"]);
/// assert_eq!(buttons.first(), Some(&PageButton::Page(1)));
/// ```
#[must_use]
pub fn page_buttons(current: usize, total_pages: usize) -> Vec<PageButton> {
    if total_pages == 0 {
        return Vec::new();
    }

    let current_page = current.clamp(1, total_pages);
    let leading = 1..=EDGE_PAGES.min(total_pages);
    let trailing_start = total_pages.saturating_sub(EDGE_PAGES).saturating_add(1);
    let trailing = trailing_start..=total_pages;
    let shown: BTreeSet<usize> = leading
        .chain(trailing)
        .chain(std::iter::once(current_page))
        .collect();

    let mut buttons = Vec::with_capacity(shown.len().saturating_mul(2));
    let mut previous: Option<usize> = None;
    for number in shown {
        if previous.is_some_and(|prev| number > prev.saturating_add(1)) {
            buttons.push(PageButton::Ellipsis);
        }
        buttons.push(PageButton::Page(number));
        previous = Some(number);
    }
    buttons
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page slicing and button windowing.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn rows() -> Vec<u32> {
        (1..=23).collect()
    }

    fn size(value: usize) -> PageSize {
        PageSize::new(value).expect("non-zero page size")
    }

    fn labels(buttons: &[PageButton]) -> Vec<String> {
        buttons.iter().map(ToString::to_string).collect()
    }

    #[rstest]
    fn concatenated_pages_reproduce_the_list(rows: Vec<u32>) {
        for page_size in [1, 2, 5, 7, 10, 23, 50] {
            let rebuilt: Vec<u32> = pages(&rows, size(page_size))
                .flat_map(|page| page.items().to_vec())
                .collect();
            assert_eq!(rebuilt, rows, "page size {page_size}");
        }
    }

    #[rstest]
    fn last_page_is_partial_but_non_empty(rows: Vec<u32>) {
        let last = pages(&rows, size(10)).last().expect("at least one page");
        assert_eq!(last.number(), 3);
        assert_eq!(last.items(), &[21, 22, 23]);
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(3, 3)]
    #[case(99, 3)]
    fn out_of_range_pages_clamp(rows: Vec<u32>, #[case] requested: usize, #[case] expected: usize) {
        assert_eq!(paginate(&rows, size(10), requested).number(), expected);
    }

    #[test]
    fn empty_list_has_no_pages_and_hides_controls() {
        let rows: Vec<u32> = Vec::new();
        let page = paginate(&rows, size(10), 1);
        assert!(page.is_empty());
        assert_eq!(page.total_pages(), 0);
        assert!(!page.show_controls());
        assert!(page.buttons().is_empty());
        assert_eq!(pages(&rows, size(10)).count(), 0);
    }

    #[rstest]
    fn single_page_hides_controls(rows: Vec<u32>) {
        assert!(!paginate(&rows, size(50), 1).show_controls());
        assert!(paginate(&rows, size(5), 1).show_controls());
    }

    #[rstest]
    #[case(1, 1, &["1"])]
    #[case(1, 6, &["1", "2", "3", "4", "5", "6"])]
    #[case(1, 10, &["1", "2", "3", "...", "8", "9", "10"])]
    #[case(4, 10, &["1", "2", "3", "4", "...", "8", "9", "10"])]
    #[case(5, 10, &["1", "2", "3", "...", "5", "...", "8", "9", "10"])]
    #[case(7, 10, &["1", "2", "3", "...", "7", "8", "9", "10"])]
    #[case(42, 10, &["1", "2", "3", "...", "8", "9", "10"])]
    fn page_buttons_window_first_current_last(
        #[case] current: usize,
        #[case] total: usize,
        #[case] expected: &[&str],
    ) {
        assert_eq!(labels(&page_buttons(current, total)), expected);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(PageSize::new(0), Err(PaginationError::ZeroPageSize));
        assert_eq!(PageSize::default().get(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_size_deserialises_with_validation() {
        let parsed: PageSize = serde_json::from_str("5").expect("valid page size");
        assert_eq!(parsed.get(), 5);
        assert!(serde_json::from_str::<PageSize>("0").is_err());
    }
}
