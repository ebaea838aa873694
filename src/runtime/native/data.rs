//! Native data access: blocking sheet fetch, saved payloads, export files.

use crate::export::ExportArtifact;
use crate::model::Dataset;
use crate::source::{self, SourceConfig};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

fn http_client() -> Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .user_agent(concat!("sheet-search/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Fetches the sheet once and parses it into a dataset.
///
/// Errors never contain the API key.
pub fn fetch_dataset(config: &SourceConfig) -> Result<Dataset> {
    let client = http_client()?;
    let response = client
        .get(config.values_url())
        .send()
        .map_err(reqwest::Error::without_url)
        .with_context(|| format!("request to {} failed", config.redacted_url()))?;

    source::check_status(config, response.status().as_u16())?;

    let body = response
        .text()
        .map_err(reqwest::Error::without_url)
        .context("failed to read response body")?;
    Ok(source::parse_dataset(&body)?)
}

/// Loads a `values.get` response previously saved to disk.
pub fn load_dataset_file(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    let body = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    source::parse_dataset(&body).with_context(|| format!("failed to parse {}", path.display()))
}

/// Reads from `file` when given, otherwise from the network.
pub fn load_dataset(config: &SourceConfig, file: Option<&Path>) -> Result<Dataset> {
    match file {
        Some(path) => load_dataset_file(path),
        None => fetch_dataset(config),
    }
}

/// Writes `artifact` into `dir`, creating it if needed. Returns the file path.
pub fn write_artifact(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(&artifact.file_name);
    fs::write(&path, &artifact.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Current UTC calendar date, used to name exports.
pub fn today_utc() -> NaiveDate {
    chrono::Utc::now().date_naive()
}
