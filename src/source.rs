//! Remote sheet source: endpoint configuration and response parsing.
//!
//! The HTTP transport itself is runtime-specific (blocking on native, async in
//! the browser); both runtimes build the URL and parse the body through here.

use crate::model::{Dataset, SheetValues};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const DEFAULT_SPREADSHEET_ID: &str = "1MEQy5QU1lUKyJBj8BvJh3a_VXLojPObKNDOCMCMoDw0";
pub const DEFAULT_RANGE: &str = "Página1!A:H";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to parse sheet values: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where to read the sheet from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub spreadsheet_id: String,
    /// A1 range expression, e.g. `Sheet1!A:H`.
    pub range: String,
    /// Sheets API key. Never logged.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: DEFAULT_SPREADSHEET_ID.to_string(),
            range: DEFAULT_RANGE.to_string(),
            api_key: None,
        }
    }
}

impl SourceConfig {
    /// Full `values.get` URL, including the key when one is configured.
    pub fn values_url(&self) -> String {
        let mut url = self.redacted_url();
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            url.push_str("?key=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }

    /// The URL without the key, safe for logs and error messages.
    pub fn redacted_url(&self) -> String {
        format!(
            "{}/{}/values/{}",
            SHEETS_API_BASE,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(&self.range)
        )
    }
}

/// Parses a `values.get` response body into a dataset (header row dropped).
pub fn parse_dataset(body: &str) -> Result<Dataset, SourceError> {
    let values: SheetValues = serde_json::from_str(body)?;
    Ok(Dataset::from_values(values))
}

/// Maps a non-success HTTP status to an error carrying the redacted URL.
pub fn check_status(config: &SourceConfig, status: u16) -> Result<(), SourceError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(SourceError::Status {
            url: config.redacted_url(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_url_encodes_range() {
        let config = SourceConfig {
            spreadsheet_id: "abc".to_string(),
            range: "Página1!A:H".to_string(),
            api_key: Some("k3y".to_string()),
        };
        assert_eq!(
            config.values_url(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/P%C3%A1gina1%21A%3AH?key=k3y"
        );
    }

    #[test]
    fn test_redacted_url_has_no_key() {
        let config = SourceConfig {
            api_key: Some("secret".to_string()),
            ..SourceConfig::default()
        };
        assert!(!config.redacted_url().contains("secret"));
        assert!(config.values_url().ends_with("?key=secret"));
    }

    #[test]
    fn test_missing_key_omits_query() {
        let config = SourceConfig::default();
        assert!(!config.values_url().contains('?'));
        let config = SourceConfig {
            api_key: Some(String::new()),
            ..SourceConfig::default()
        };
        assert!(!config.values_url().contains('?'));
    }

    #[test]
    fn test_parse_dataset() {
        let body = r#"{"range":"A1:H3","majorDimension":"ROWS","values":[["Name"],["Alice","Y"],["Bob"]]}"#;
        let dataset = parse_dataset(body).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0][0], "Alice");
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_dataset("<html>quota</html>"),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn test_check_status() {
        let config = SourceConfig::default();
        assert!(check_status(&config, 200).is_ok());
        let err = check_status(&config, 403).unwrap_err();
        assert!(err.to_string().contains("HTTP 403"));
    }
}
