// Input reader: turns what the operator typed into a list of CVE ids.
// Text ending in `.csv` is treated as a file path, anything else as a
// literal comma-separated list.

use crate::error::{Result, VulnCheckError};
use std::path::Path;
use tracing::debug;

/// Default CSV column holding the CVE identifiers.
pub const DEFAULT_COLUMN: &str = "CVE_ID";

/// Where the identifiers come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource<'a> {
    CsvFile(&'a Path),
    Literal(&'a str),
}

impl<'a> InputSource<'a> {
    /// Classify operator text by suffix (case-insensitive `.csv`).
    pub fn detect(text: &'a str) -> Self {
        let trimmed = text.trim();
        if trimmed.to_ascii_lowercase().ends_with(".csv") {
            InputSource::CsvFile(Path::new(trimmed))
        } else {
            InputSource::Literal(trimmed)
        }
    }
}

/// Resolve the CVE list for `text`, reading `column` when it names a CSV file.
pub fn read_cve_ids(text: &str, column: &str) -> Result<Vec<String>> {
    let ids = match InputSource::detect(text) {
        InputSource::CsvFile(path) => read_csv_column(path, column)?,
        InputSource::Literal(list) => split_literal(list),
    };
    debug!(count = ids.len(), "resolved CVE identifiers");
    Ok(ids)
}

/// Split a comma-separated list, trimming each entry. Blank input gives an
/// empty list; otherwise every segment is kept, empty ones included.
pub fn split_literal(list: &str) -> Vec<String> {
    if list.trim().is_empty() {
        return Vec::new();
    }
    list.split(',').map(|s| s.trim().to_string()).collect()
}

/// Read one column of a header-tagged CSV file, keeping row order.
pub fn read_csv_column(path: &Path, column: &str) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(VulnCheckError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let index = reader
        .headers()?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| VulnCheckError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record?;
        // short rows have no value for the column
        ids.push(record.get(index).unwrap_or_default().to_string());
    }
    Ok(ids)
}
