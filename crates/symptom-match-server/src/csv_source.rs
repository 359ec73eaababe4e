//! CSV catalog source.
//!
//! Turns a headed CSV file into [`CatalogRow`]s. Two layouts are supported:
//! one yes/no column per symptom, or one column holding a serialized list.

use std::io::Read;
use std::path::Path;

use symptom_match_core::CatalogRow;
use thiserror::Error;

/// Catalog source errors.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column {column:?} not found in header")]
    MissingColumn { column: String },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Which columns carry the condition and its symptoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLayout {
    /// Every column except `condition_column` is a yes/no symptom flag.
    Flags { condition_column: String },
    /// `symptoms_column` holds a list such as `['fever', 'cough']`.
    Listed {
        condition_column: String,
        symptoms_column: String,
    },
}

/// Read all rows of the CSV file at `path`.
pub fn read_catalog_rows(path: &Path, layout: &CatalogLayout) -> SourceResult<Vec<CatalogRow>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    collect_rows(reader, layout)
}

/// Read all rows from any CSV byte stream.
pub fn read_catalog_rows_from<R: Read>(input: R, layout: &CatalogLayout) -> SourceResult<Vec<CatalogRow>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(input);
    collect_rows(reader, layout)
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>, layout: &CatalogLayout) -> SourceResult<Vec<CatalogRow>> {
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SourceError::MissingColumn {
                column: name.to_string(),
            })
    };

    let mut rows = Vec::new();
    match layout {
        CatalogLayout::Flags { condition_column } => {
            let condition_idx = column(condition_column.as_str())?;
            for record in reader.records() {
                let record = record?;
                let columns = headers
                    .iter()
                    .zip(record.iter())
                    .enumerate()
                    .filter(|(idx, _)| *idx != condition_idx)
                    .map(|(_, (header, value))| (header.to_string(), value.to_string()))
                    .collect();
                rows.push(CatalogRow::Flags {
                    condition: record.get(condition_idx).unwrap_or_default().to_string(),
                    columns,
                });
            }
        }
        CatalogLayout::Listed {
            condition_column,
            symptoms_column,
        } => {
            let condition_idx = column(condition_column.as_str())?;
            let symptoms_idx = column(symptoms_column.as_str())?;
            for record in reader.records() {
                let record = record?;
                rows.push(CatalogRow::Listed {
                    condition: record.get(condition_idx).unwrap_or_default().to_string(),
                    symptoms: record.get(symptoms_idx).unwrap_or_default().to_string(),
                });
            }
        }
    }

    Ok(rows)
}
