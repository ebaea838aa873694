//! Sorting and pagination for the table view.
//!
//! These are pure derivations over row indices: the dataset is never
//! reordered in place.

use crate::model::{Row, cell};
use std::ops::Range;

/// Page sizes offered to the user, in cycling order.
pub const ROWS_PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 20];

pub const DEFAULT_ROWS_PER_PAGE: usize = ROWS_PER_PAGE_OPTIONS[0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Active sort column and direction. `column == None` keeps fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub column: Option<usize>,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Header activation: ascending on the same column flips to descending,
    /// everything else starts ascending on `column`.
    pub fn toggle(&mut self, column: usize) {
        self.direction = if self.column == Some(column)
            && self.direction == SortDirection::Ascending
        {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        self.column = Some(column);
    }

    /// Direction to draw next to the header of `column`, if it is the sort key.
    pub fn indicator(&self, column: usize) -> Option<SortDirection> {
        (self.column == Some(column)).then_some(self.direction)
    }
}

/// Returns `indices` ordered by the configured column, comparing cell strings
/// lexicographically. Missing cells compare as `""`. Equal keys keep their
/// relative order.
pub fn sort_indices(rows: &[Row], indices: &[usize], sort: SortConfig) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    let Some(column) = sort.column else {
        return sorted;
    };

    let key = |idx: usize| rows.get(idx).map(|row| cell(row, column)).unwrap_or("");
    sorted.sort_by(|&a, &b| {
        let ordering = key(a).cmp(key(b));
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    sorted
}

/// Current page (1-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page: usize,
    pub rows_per_page: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

impl PageState {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            page: 1,
            rows_per_page: rows_per_page.max(1),
        }
    }

    /// `ceil(row_count / rows_per_page)`; zero when there are no rows.
    pub fn total_pages(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.rows_per_page)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, row_count: usize) -> bool {
        self.page < self.total_pages(row_count)
    }

    /// Returns `true` if the page changed.
    pub fn next(&mut self, row_count: usize) -> bool {
        if self.has_next(row_count) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Returns `true` if the page changed.
    pub fn previous(&mut self) -> bool {
        if self.has_previous() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn first(&mut self) {
        self.page = 1;
    }

    pub fn last(&mut self, row_count: usize) {
        self.page = self.total_pages(row_count).max(1);
    }

    /// Pulls the current page back into `1..=total_pages`.
    pub fn clamp(&mut self, row_count: usize) {
        self.page = self.page.clamp(1, self.total_pages(row_count).max(1));
    }

    /// Switches page size, keeping the page number in range.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize, row_count: usize) {
        self.rows_per_page = rows_per_page.max(1);
        self.clamp(row_count);
    }

    /// Moves to the next entry of [`ROWS_PER_PAGE_OPTIONS`], wrapping around.
    pub fn cycle_rows_per_page(&mut self, row_count: usize) {
        let next = ROWS_PER_PAGE_OPTIONS
            .iter()
            .position(|&n| n == self.rows_per_page)
            .map(|pos| ROWS_PER_PAGE_OPTIONS[(pos + 1) % ROWS_PER_PAGE_OPTIONS.len()])
            .unwrap_or(DEFAULT_ROWS_PER_PAGE);
        self.set_rows_per_page(next, row_count);
    }

    /// Slice bounds of the current page within a sequence of `row_count`
    /// items. Empty when the page is past the end.
    pub fn page_range(&self, row_count: usize) -> Range<usize> {
        let start = (self.page.saturating_sub(1) * self.rows_per_page).min(row_count);
        let end = (start + self.rows_per_page).min(row_count);
        start..end
    }
}
