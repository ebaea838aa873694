//! Export of table data to CSV and XLSX artifacts.
//!
//! Everything here produces bytes in memory; writing them to disk or
//! handing them to the browser is left to the runtime.

use crate::model::{COLUMN_COUNT, COLUMN_LABELS, Row, cell};
use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SHEET_NAME: &str = "Sheet1";

/// Fill color of the header row in styled workbooks.
pub const HEADER_FILL: u32 = 0x1F4E78;
/// Width applied to every column of a styled workbook, in character units.
pub const STYLED_COLUMN_WIDTH: f64 = 20.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no columns selected for export")]
    NoColumns,
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("failed to flush export buffer: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    /// Workbook with a bold filled header, borders and fixed column widths.
    XlsxStyled,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx | ExportFormat::XlsxStyled => "xlsx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Xlsx | ExportFormat::XlsxStyled => XLSX_MIME,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::XlsxStyled => "xlsx-styled",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "xlsx-styled" | "styled" => Ok(ExportFormat::XlsxStyled),
            _ => Err(format!(
                "Unknown export format: {s}. Expected csv, xlsx or xlsx-styled"
            )),
        }
    }
}

/// Which rows an export reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportScope {
    /// Rows matching the current query, in fetch order.
    #[default]
    Filtered,
    /// The whole dataset, ignoring the query.
    All,
}

impl ExportScope {
    pub fn toggled(self) -> Self {
        match self {
            ExportScope::Filtered => ExportScope::All,
            ExportScope::All => ExportScope::Filtered,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportScope::Filtered => "filtered",
            ExportScope::All => "all rows",
        }
    }
}

/// Ordered subset of columns written by exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSelection {
    columns: Vec<usize>,
}

impl Default for ExportSelection {
    fn default() -> Self {
        Self {
            columns: (0..COLUMN_COUNT).collect(),
        }
    }
}

impl ExportSelection {
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn contains(&self, column: usize) -> bool {
        self.columns.contains(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Removes `column` if selected, otherwise appends it after the current
    /// selection. Out-of-range columns are ignored.
    pub fn toggle(&mut self, column: usize) {
        if column >= COLUMN_COUNT {
            return;
        }
        if let Some(pos) = self.columns.iter().position(|&c| c == column) {
            self.columns.remove(pos);
        } else {
            self.columns.push(column);
        }
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.columns.iter().map(|&c| COLUMN_LABELS[c]).collect()
    }
}

/// Header plus records, ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub header: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl ExportTable {
    /// Projects `rows` onto the selected columns. Missing cells become `""`.
    pub fn build<'a, I>(rows: I, selection: &ExportSelection) -> Result<Self, ExportError>
    where
        I: IntoIterator<Item = &'a Row>,
    {
        if selection.is_empty() {
            return Err(ExportError::NoColumns);
        }
        let header = selection.labels().into_iter().map(String::from).collect();
        let records = rows
            .into_iter()
            .map(|row| {
                selection
                    .columns()
                    .iter()
                    .map(|&c| cell(row, c).to_string())
                    .collect()
            })
            .collect();
        Ok(Self { header, records })
    }

    /// Header included.
    pub fn row_count(&self) -> usize {
        1 + self.records.len()
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.header)?;
        for record in &self.records {
            writer.write_record(record)?;
        }
        writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(SHEET_NAME)?;
            for (col, label) in self.header.iter().enumerate() {
                worksheet.write_string(0, col as u16, label)?;
            }
            for (row_idx, record) in self.records.iter().enumerate() {
                for (col, value) in record.iter().enumerate() {
                    worksheet.write_string(row_idx as u32 + 1, col as u16, value)?;
                }
            }
        }
        Ok(workbook.save_to_buffer()?)
    }

    pub fn to_styled_xlsx(&self) -> Result<Vec<u8>, ExportError> {
        let header_format = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_font_color(Color::White);
        let cell_format = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);

        let mut workbook = Workbook::new();
        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(SHEET_NAME)?;
            worksheet.set_right_to_left(false);
            for (col, label) in self.header.iter().enumerate() {
                worksheet.set_column_width(col as u16, STYLED_COLUMN_WIDTH)?;
                worksheet.write_string_with_format(0, col as u16, label, &header_format)?;
            }
            for (row_idx, record) in self.records.iter().enumerate() {
                for (col, value) in record.iter().enumerate() {
                    worksheet.write_string_with_format(
                        row_idx as u32 + 1,
                        col as u16,
                        value,
                        &cell_format,
                    )?;
                }
            }
        }
        Ok(workbook.save_to_buffer()?)
    }

    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Xlsx => self.to_xlsx(),
            ExportFormat::XlsxStyled => self.to_styled_xlsx(),
        }
    }
}

/// `export-<YYYY-MM-DD>.<ext>`
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!("export-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// An encoded export, named and typed for saving or downloading.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Builds the table for `rows` and encodes it as `format`.
pub fn render_export<'a, I>(
    rows: I,
    selection: &ExportSelection,
    format: ExportFormat,
    date: NaiveDate,
) -> Result<ExportArtifact, ExportError>
where
    I: IntoIterator<Item = &'a Row>,
{
    let table = ExportTable::build(rows, selection)?;
    let bytes = table.encode(format)?;
    Ok(ExportArtifact {
        file_name: export_file_name(format, date),
        mime: format.mime(),
        bytes,
    })
}
