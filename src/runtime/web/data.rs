//! Web-specific data fetching: one async request to the Sheets API.
//! Shared model types live in `crate::model`.

use crate::model::Dataset;
use crate::source::{self, SourceConfig};
use anyhow::{Context, Result};

/// Source settings baked in at build time. The key comes from the
/// `SHEET_SEARCH_API_KEY` environment variable of the build, if set.
pub fn source_config() -> SourceConfig {
    SourceConfig {
        api_key: option_env!("SHEET_SEARCH_API_KEY").map(str::to_string),
        ..SourceConfig::default()
    }
}

pub async fn fetch_dataset(config: &SourceConfig) -> Result<Dataset> {
    let response = reqwest::get(config.values_url())
        .await
        .map_err(reqwest::Error::without_url)
        .with_context(|| format!("request to {} failed", config.redacted_url()))?;

    source::check_status(config, response.status().as_u16())?;

    let text = response
        .text()
        .await
        .map_err(reqwest::Error::without_url)
        .context("failed to read response body")?;
    Ok(source::parse_dataset(&text)?)
}
