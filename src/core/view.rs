//! Search and pagination over an in-memory [`Dataset`].
//!
//! Everything here is pure: the functions take the dataset and the current
//! query/page and return indices, counts or slices. State bookkeeping lives in
//! [`crate::core::state`].

use serde::{Deserialize, Serialize};

use crate::domain::model::{Dataset, Row};

pub const DEFAULT_PAGE_SIZE: usize = 5;

pub const DEFAULT_SEARCH_FIELDS: [&str; 5] = ["name", "body", "email", "id", "postId"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageCountMode {
    /// `ceil(n / size)`, never less than one.
    #[default]
    Exact,
    /// One page up to `size` rows, `ceil(n / size) - 1` beyond that. Drops the
    /// trailing page; kept so older exports can be compared page for page.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub page_size: usize,
    pub search_fields: Vec<String>,
    pub page_count_mode: PageCountMode,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_fields: DEFAULT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
            page_count_mode: PageCountMode::Exact,
        }
    }
}

/// Case-sensitive substring match against the configured fields.
/// Missing fields never match.
pub fn row_matches(row: &Row, term: &str, fields: &[String]) -> bool {
    fields
        .iter()
        .filter_map(|field| row.get(field))
        .any(|value| value.contains(term))
}

/// Indices of the rows that match `term`. An empty term selects everything.
pub fn filter_indices(dataset: &Dataset, term: &str, fields: &[String]) -> Vec<usize> {
    if term.is_empty() {
        return (0..dataset.len()).collect();
    }

    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, term, fields))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn page_count(total: usize, page_size: usize, mode: PageCountMode) -> usize {
    let page_size = page_size.max(1);
    let exact = total.div_ceil(page_size).max(1);
    match mode {
        PageCountMode::Exact => exact,
        PageCountMode::Legacy if total <= page_size => 1,
        PageCountMode::Legacy => exact - 1,
    }
}

/// Highest page index that still holds rows.
pub fn last_page_index(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).saturating_sub(1)
}

/// Half-open range `[start, end)` of page `page` within `total` items.
/// Pages past the end clamp to the last non-empty page.
pub fn page_bounds(total: usize, page_size: usize, page: usize) -> (usize, usize) {
    let page_size = page_size.max(1);
    let page = page.min(last_page_index(total, page_size));
    let start = (page * page_size).min(total);
    let end = (start + page_size).min(total);
    (start, end)
}

pub fn page_slice<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    let (start, end) = page_bounds(items.len(), page_size, page);
    &items[start..end]
}
