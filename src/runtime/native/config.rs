//! Command line arguments, the optional `config.toml`, and platform paths.
//!
//! Precedence for every setting: CLI flag, then environment (via clap's
//! `env`), then the config file, then the built-in default.

use crate::export::ExportFormat;
use crate::source::{DEFAULT_RANGE, DEFAULT_SPREADSHEET_ID, SourceConfig};
use crate::table::{DEFAULT_ROWS_PER_PAGE, ROWS_PER_PAGE_OPTIONS};
use crate::theme::Theme;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOG_FILE_NAME: &str = "sheet-search.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "sheet-search: browse a spreadsheet-backed case list in the terminal.\n\
                  Filter by name, sort by any column, page through results and export CSV or Excel."
)]
pub struct Args {
    /// Load a saved values.get JSON response instead of fetching
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Spreadsheet to read
    #[arg(long)]
    pub spreadsheet_id: Option<String>,

    /// A1 range to read, e.g. "Sheet1!A:H"
    #[arg(long)]
    pub range: Option<String>,

    /// Sheets API key
    #[arg(long, env = "SHEET_SEARCH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// UI theme (light, dark)
    #[arg(short, long)]
    pub theme: Option<Theme>,

    /// Rows per page (5, 10, 20)
    #[arg(long, value_parser = parse_rows_per_page)]
    pub rows_per_page: Option<usize>,

    /// Directory exports are written to
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Config file to read instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show all paths used by the application (config, data, log)
    #[arg(long)]
    pub paths: bool,

    /// Log filter, e.g. "debug" or "sheet_search=trace"
    #[arg(long, env = "SHEET_SEARCH_LOG")]
    pub log_level: Option<String>,

    /// Write one export without starting the UI (csv, xlsx, xlsx-styled)
    #[arg(long)]
    pub export: Option<ExportFormat>,

    /// Name filter applied before a headless export
    #[arg(short, long, requires = "export")]
    pub query: Option<String>,

    /// Export every row instead of the filtered ones
    #[arg(long, requires = "export")]
    pub all: bool,
}

fn parse_rows_per_page(value: &str) -> Result<usize, String> {
    let rows: usize = value
        .parse()
        .map_err(|_| format!("not a number: {value}"))?;
    check_rows_per_page(rows).map_err(|err| err.to_string())
}

fn check_rows_per_page(rows: usize) -> Result<usize, ConfigError> {
    if ROWS_PER_PAGE_OPTIONS.contains(&rows) {
        Ok(rows)
    } else {
        Err(ConfigError::RowsPerPage(rows))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine platform directories")]
    NoProjectDirs,
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid theme in config file: {0}")]
    Theme(String),
    #[error("rows per page must be one of 5, 10 or 20 (got {0})")]
    RowsPerPage(usize),
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub spreadsheet_id: Option<String>,
    pub range: Option<String>,
    pub api_key: Option<String>,
    pub theme: Option<String>,
    pub rows_per_page: Option<usize>,
    pub export_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Reads `path`; a missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Platform locations, from `directories`.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self, ConfigError> {
        let project_dirs = directories::ProjectDirs::from("com", "sheet-search", "sheet-search")
            .ok_or(ConfigError::NoProjectDirs)?;
        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
            data_dir: project_dirs.data_dir().to_path_buf(),
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SourceConfig,
    pub file: Option<PathBuf>,
    pub theme: Theme,
    pub rows_per_page: usize,
    pub export_dir: PathBuf,
    pub log_level: String,
}

impl Settings {
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self, ConfigError> {
        let theme = match (args.theme, file.theme.as_deref()) {
            (Some(theme), _) => theme,
            (None, Some(name)) => name.parse().map_err(ConfigError::Theme)?,
            (None, None) => Theme::default(),
        };

        let rows_per_page = match (args.rows_per_page, file.rows_per_page) {
            (Some(rows), _) => rows,
            (None, Some(rows)) => check_rows_per_page(rows)?,
            (None, None) => DEFAULT_ROWS_PER_PAGE,
        };

        let source = SourceConfig {
            spreadsheet_id: args
                .spreadsheet_id
                .clone()
                .or(file.spreadsheet_id)
                .unwrap_or_else(|| DEFAULT_SPREADSHEET_ID.to_string()),
            range: args
                .range
                .clone()
                .or(file.range)
                .unwrap_or_else(|| DEFAULT_RANGE.to_string()),
            api_key: args.api_key.clone().or(file.api_key),
        };

        Ok(Self {
            source,
            file: args.file.clone(),
            theme,
            rows_per_page,
            export_dir: args
                .export_dir
                .clone()
                .or(file.export_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_level: args
                .log_level
                .clone()
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// Short description of the data source for the title bar.
    pub fn source_label(&self) -> String {
        match &self.file {
            Some(path) => path.display().to_string(),
            None => self.source.range.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sheet-search").chain(extra.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&args(&[]), FileConfig::default()).unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.rows_per_page, 5);
        assert_eq!(settings.source.spreadsheet_id, DEFAULT_SPREADSHEET_ID);
        assert_eq!(settings.source.range, DEFAULT_RANGE);
        assert_eq!(settings.export_dir, PathBuf::from("."));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            theme: Some("light".to_string()),
            rows_per_page: Some(20),
            range: Some("Other!A:H".to_string()),
            ..FileConfig::default()
        };
        let settings =
            Settings::resolve(&args(&["--theme", "dark", "--rows-per-page", "10"]), file).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.rows_per_page, 10);
        assert_eq!(settings.source.range, "Other!A:H");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Args::try_parse_from(["sheet-search", "--rows-per-page", "7"]).is_err());
        assert!(Args::try_parse_from(["sheet-search", "--query", "bob"]).is_err());

        let file = FileConfig {
            rows_per_page: Some(50),
            ..FileConfig::default()
        };
        assert!(matches!(
            Settings::resolve(&args(&[]), file),
            Err(ConfigError::RowsPerPage(50))
        ));

        let file = FileConfig {
            theme: Some("solarized".to_string()),
            ..FileConfig::default()
        };
        assert!(matches!(
            Settings::resolve(&args(&[]), file),
            Err(ConfigError::Theme(_))
        ));
    }

    #[test]
    fn test_headless_export_args() {
        let parsed = args(&["--export", "xlsx-styled", "--query", "ali", "--all"]);
        assert_eq!(parsed.export, Some(ExportFormat::XlsxStyled));
        assert_eq!(parsed.query.as_deref(), Some("ali"));
        assert!(parsed.all);
    }

    #[test]
    fn test_load_file_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "theme = \"dark\"\nrows_per_page = 20\napi_key = \"k\"").unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.theme.as_deref(), Some("dark"));
        assert_eq!(config.rows_per_page, Some(20));
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_load_file_config_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(CONFIG_FILE_NAME);
        assert_eq!(FileConfig::load(&missing).unwrap(), FileConfig::default());

        fs::write(&missing, "colour = \"blue\"").unwrap();
        assert!(matches!(
            FileConfig::load(&missing),
            Err(ConfigError::Parse { .. })
        ));
    }
}
