use std::collections::HashSet;
use std::io::Cursor;

use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::Value;
use thiserror::Error;

use crate::models::{ColumnDescriptor, ColumnKind, SheetTable};

const PREVIEW_ROWS: usize = 10;

/// Upload validation and parse failures, in the order they are checked.
/// Display strings are the messages the front-end shows to the user.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Nombre de archivo vacío")]
    MissingFile,
    #[error("Solo se aceptan archivos Excel (.xlsx, .xls)")]
    UnsupportedFormat,
    #[error("Archivo demasiado grande (máximo 10MB)")]
    TooLarge,
    #[error("Error al procesar el archivo Excel: {0}")]
    CorruptFile(String),
    #[error("El archivo Excel está vacío")]
    EmptyFile,
}

/// Validates and parses an uploaded workbook into a [`SheetTable`].
///
/// The first row of the first sheet is the header. Validation short-circuits
/// in a fixed order: filename, extension, size, parse, non-empty.
pub fn ingest(
    file_data: Bytes,
    filename: &str,
    size_limit: usize,
) -> Result<SheetTable, IngestError> {
    if filename.is_empty() {
        return Err(IngestError::MissingFile);
    }
    if !(filename.ends_with(".xlsx") || filename.ends_with(".xls")) {
        return Err(IngestError::UnsupportedFormat);
    }
    if file_data.len() > size_limit {
        return Err(IngestError::TooLarge);
    }

    let cursor = Cursor::new(file_data);
    let mut workbook = open_workbook_auto_from_rs(cursor).map_err(|e| {
        tracing::error!("Failed to open workbook: {}", e);
        IngestError::CorruptFile(e.to_string())
    })?;

    let (sheet_name, range) = workbook
        .worksheets()
        .into_iter()
        .next()
        .ok_or(IngestError::EmptyFile)?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(IngestError::EmptyFile)?;
    let data_rows: Vec<&[Data]> = rows.collect();
    if data_rows.is_empty() {
        return Err(IngestError::EmptyFile);
    }
    let total_rows = data_rows.len();

    let titles = column_titles(header);
    let mut columns = Vec::with_capacity(titles.len());
    let mut raw_series = IndexMap::with_capacity(titles.len());

    for (idx, name) in titles.iter().enumerate() {
        let cells: Vec<Data> = data_rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or(Data::Empty))
            .collect();

        let (kind, count) = infer_kind(&cells);
        let series: Vec<Value> = cells.iter().filter_map(cell_value).collect();

        columns.push(ColumnDescriptor {
            name: name.clone(),
            kind,
            count,
        });
        raw_series.insert(name.clone(), series);
    }

    let preview_rows: Vec<IndexMap<String, Value>> = data_rows
        .iter()
        .take(PREVIEW_ROWS)
        .map(|row| {
            titles
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let value = row
                        .get(idx)
                        .and_then(cell_value)
                        .unwrap_or_else(|| Value::String(String::new()));
                    (name.clone(), value)
                })
                .collect()
        })
        .collect();

    tracing::info!(
        "Parsed sheet '{}': {} rows, {} columns",
        sheet_name,
        total_rows,
        titles.len()
    );

    Ok(SheetTable {
        columns,
        preview_rows,
        raw_series,
        total_rows,
    })
}

/// Column names from the header row: blank cells become positional names,
/// duplicates get a numeric suffix.
fn column_titles(header: &[Data]) -> Vec<String> {
    let mut existing_names = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match cell {
                Data::Empty => format!("col_{idx}"),
                other => {
                    let text = other.to_string();
                    if text.is_empty() {
                        format!("col_{idx}")
                    } else {
                        text
                    }
                }
            };

            let mut name = base.clone();
            let mut counter = 1;
            while !existing_names.insert(name.clone()) {
                name = format!("{base}_{counter}");
                counter += 1;
            }
            name
        })
        .collect()
}

fn infer_kind(cells: &[Data]) -> (ColumnKind, usize) {
    let (non_missing, numeric) = cells
        .par_iter()
        .fold(
            || (0usize, 0usize),
            |(mut total, mut numeric), cell| {
                match cell {
                    Data::Empty => {}
                    Data::Int(_) | Data::Float(_) => {
                        total += 1;
                        numeric += 1;
                    }
                    _ => total += 1,
                }
                (total, numeric)
            },
        )
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    if non_missing == 0 {
        (ColumnKind::Empty, 0)
    } else if numeric == non_missing {
        (ColumnKind::Quantitative, non_missing)
    } else {
        (ColumnKind::Qualitative, non_missing)
    }
}

/// JSON value for one cell; `None` marks a missing cell.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => Some(
            serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string())),
        ),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => Some(Value::String(match dt.as_datetime() {
            Some(parsed) => parsed.to_string(),
            None => dt.as_f64().to_string(),
        })),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Error(_) => Some(Value::String(cell.to_string())),
    }
}
