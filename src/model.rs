//! Shared data model types used by both native and web runtimes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Fixed column labels, positionally matching the cells of every [`Row`].
pub const COLUMN_LABELS: [&str; 8] = [
    "Name",
    "Contract Signed",
    "DOA",
    "BI Limits",
    "UM",
    "Status",
    "Settlement",
    "Attorney’s Fee",
];

/// Number of columns shown in the table and available for export.
pub const COLUMN_COUNT: usize = COLUMN_LABELS.len();

/// Index of the column the free-text query is matched against.
pub const NAME_COLUMN: usize = 0;

/// One record of the sheet. Cells are opaque strings; trailing cells may be
/// missing because the remote source trims empty ones.
pub type Row = Vec<String>;

/// Returns the cell at `column`, or `""` when the row is too short.
pub fn cell(row: &[String], column: usize) -> &str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// The whole in-memory collection of rows, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Builds a dataset from a raw sheet range, discarding the header row.
    pub fn from_values(values: SheetValues) -> Self {
        let rows = values.values.map(|rows| rows.into_iter().skip(1).collect());
        Self {
            rows: rows.unwrap_or_default(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }
}

/// Body of a `spreadsheets.values.get` response.
///
/// `values` is absent when the requested range is empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetValues {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default, deserialize_with = "deserialize_cells")]
    pub values: Option<Vec<Row>>,
}

/// Accepts numbers and booleans in cells as well as strings, keeping their
/// JSON text. `null` cells become empty strings.
fn deserialize_cells<'de, D>(deserializer: D) -> Result<Option<Vec<Row>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Vec<Value>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|rows| {
        rows.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| match v {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_values_skips_header() {
        let values: SheetValues = serde_json::from_value(json!({
            "range": "Sheet!A1:H3",
            "values": [
                ["Name", "Contract Signed"],
                ["Alice", "Y"],
                ["Bob", "N"]
            ]
        }))
        .unwrap();

        let dataset = Dataset::from_values(values);
        assert_eq!(dataset.len(), 2);
        assert_eq!(cell(&dataset.rows()[0], 0), "Alice");
        assert_eq!(cell(&dataset.rows()[1], 1), "N");
    }

    #[test]
    fn test_missing_values_is_empty_dataset() {
        let values: SheetValues = serde_json::from_value(json!({"range": "A:H"})).unwrap();
        assert!(Dataset::from_values(values).is_empty());
    }

    #[test]
    fn test_non_string_cells_keep_json_text() {
        let values: SheetValues = serde_json::from_value(json!({
            "values": [["h"], ["Carol", 42, true, null]]
        }))
        .unwrap();
        let dataset = Dataset::from_values(values);
        assert_eq!(dataset.rows()[0], vec!["Carol", "42", "true", ""]);
    }

    #[test]
    fn test_cell_out_of_range_is_empty() {
        let row: Row = vec!["Alice".to_string()];
        assert_eq!(cell(&row, 0), "Alice");
        assert_eq!(cell(&row, 7), "");
    }
}
