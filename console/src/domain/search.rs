//! Case-insensitive free-text filtering for list views.

/// Rows that expose the text columns a search box matches against.
pub trait Searchable {
    /// Columns checked for a substring match.
    fn search_fields(&self) -> Vec<&str>;
}

/// Keep rows where any searchable column contains `text`, ignoring case.
///
/// Blank text returns the list unchanged. Order is preserved, and applying the
/// same filter twice yields the same result.
///
/// # Examples
/// ```
/// use portal_console::domain::search::{filter, Searchable};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Row(&'static str);
/// impl Searchable for Row {
///     fn search_fields(&self) -> Vec<&str> { vec![self.0] }
/// }
///
/// let rows = vec![Row("Springfield"), Row("Shelbyville")];
/// assert_eq!(filter(&rows, "FIELD"), vec![Row("Springfield")]);
/// assert_eq!(filter(&rows, "  "), rows);
/// ```
pub fn filter<T>(items: &[T], text: &str) -> Vec<T>
where
    T: Searchable + Clone,
{
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| {
            item.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}
