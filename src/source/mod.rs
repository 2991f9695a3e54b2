//! Row sources
//!
//! Reads spreadsheet exports (CSV) or JSON row files, validates the column
//! set and hands typed rows to the tree builder. Missing optional values
//! default to empty strings and `granular` defaults to true.

mod columns;
mod json_rows;
mod sheet;

use std::path::{Path, PathBuf};

use cpq_tree::{ConfigurationRow, ItemRow};

pub use columns::{parse_granular, CONFIGURATION_COLUMNS, ITEM_COLUMNS};
pub use sheet::{read_configuration_csv, read_item_csv};

/// Rows read from one input plus the package name found in the sheet, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet<R> {
    pub rows: Vec<R>,
    /// 1-based source record number of each entry in `rows`
    pub row_numbers: Vec<usize>,
    pub package_name: Option<String>,
}

impl<R> Sheet<R> {
    /// Rows paired with their source record numbers
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &R)> {
        self.row_numbers.iter().copied().zip(&self.rows)
    }
}

/// Input file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// `.json` files are JSON; everything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Required column '{0}' not found")]
    MissingColumn(String),

    #[error("Row {row}: invalid granular value '{value}'")]
    InvalidGranular { row: usize, value: String },
}

impl SourceError {
    pub fn as_code(&self) -> &'static str {
        match self {
            SourceError::Io { .. } => "SOURCE_IO",
            SourceError::Csv(_) => "SOURCE_CSV",
            SourceError::Json(_) => "SOURCE_JSON",
            SourceError::MissingColumn(_) => "MISSING_COLUMN",
            SourceError::InvalidGranular { .. } => "INVALID_GRANULAR",
        }
    }
}

fn open(path: &Path) -> Result<std::fs::File, SourceError> {
    std::fs::File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration rows from a CSV or JSON file.
pub fn load_configuration_rows(path: &Path) -> Result<Sheet<ConfigurationRow>, SourceError> {
    let file = open(path)?;
    match InputFormat::from_path(path) {
        InputFormat::Csv => read_configuration_csv(file),
        InputFormat::Json => json_rows::read_rows(file),
    }
}

/// Load item rows from a CSV or JSON file.
pub fn load_item_rows(path: &Path) -> Result<Sheet<ItemRow>, SourceError> {
    let file = open(path)?;
    match InputFormat::from_path(path) {
        InputFormat::Csv => read_item_csv(file),
        InputFormat::Json => json_rows::read_rows(file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("rows.json")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("rows.JSON")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("rows.csv")), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("rows")), InputFormat::Csv);
    }

    #[test]
    fn test_missing_file() {
        let err = load_configuration_rows(Path::new("/nonexistent/rows.csv")).unwrap_err();
        assert_eq!(err.as_code(), "SOURCE_IO");
    }
}
