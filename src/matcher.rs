use crate::highlight::contains_ignore_case;
use crate::model::{Dataset, NAME_COLUMN};

/// Returns the indices of dataset rows whose Name cell contains `query`
/// (case-insensitive), in dataset order.
///
/// An empty query matches every row. A row without a Name cell never matches
/// a non-empty query.
pub fn find_matches(query: &str, dataset: &Dataset) -> Vec<usize> {
    if query.is_empty() {
        return (0..dataset.len()).collect();
    }

    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            row.get(NAME_COLUMN)
                .is_some_and(|name| contains_ignore_case(name, query))
        })
        .map(|(idx, _)| idx)
        .collect()
}
