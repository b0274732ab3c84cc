// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Readers that turn statement files into header-keyed rows for the importer.

use crate::importer::dates::parse_date_text;
use crate::models::{RawValue, Row};
use calamine::{Data, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Any workbook calamine opens: xlsx, xls, xlsb, ods.
    Xlsx,
    Csv,
    Json,
}

impl FromStr for SourceFormat {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "xls" | "xlsb" | "ods" => Ok(SourceFormat::Xlsx),
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            other => Err(SourceError::UnknownFormat(other.to_string())),
        }
    }
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unsupported source format '{0}' (use xlsx|csv|json)")]
    UnknownFormat(String),

    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unreadable spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("spreadsheet has no worksheets")]
    NoSheet,

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Shape(String),
}

pub fn read_rows(path: &Path, format: Option<SourceFormat>) -> Result<Vec<Row>, SourceError> {
    let format = match format {
        Some(f) => f,
        None => SourceFormat::from_path(path)?,
    };
    let mut file = File::open(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    match format {
        SourceFormat::Xlsx => {
            drop(file);
            read_spreadsheet(path)
        }
        SourceFormat::Csv => read_csv(file),
        SourceFormat::Json => {
            let mut buf = String::new();
            file.read_to_string(&mut buf).map_err(|source| SourceError::Io {
                path: path.display().to_string(),
                source,
            })?;
            parse_json(&buf)
        }
    }
}

/// Rows of the first worksheet; its first row is the header. Date-formatted
/// cells become `Date`, numeric cells stay `Number`.
pub fn read_spreadsheet(path: &Path) -> Result<Vec<Row>, SourceError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or(SourceError::NoSheet)??;
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header
        .iter()
        .map(|c| c.to_string().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut out = Vec::new();
    for cells in rows {
        let values: Vec<RawValue> = cells.iter().map(cell_value).collect();
        if values.iter().all(RawValue::is_blank) {
            continue;
        }
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), values.get(i).cloned().unwrap_or(RawValue::Null)))
            .collect();
        out.push(row);
    }
    Ok(out)
}

fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Null,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Float(f) => RawValue::Number(*f),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Bool(b) => RawValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => RawValue::Date(d.date()),
            None => RawValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_date_text(s) {
            Some(d) => RawValue::Date(d),
            None => RawValue::Text(s.clone()),
        },
        Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(e) => RawValue::Text(e.to_string()),
    }
}

/// First record is the header. Cells arrive as rendered text; empty cells are
/// `Null`.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Row>, SourceError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        if rec.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let cell = rec.get(i).unwrap_or("");
                let value = if cell.trim().is_empty() {
                    RawValue::Null
                } else {
                    RawValue::Text(cell.to_string())
                };
                (h.clone(), value)
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Expects an array of flat objects.
pub fn parse_json(text: &str) -> Result<Vec<Row>, SourceError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(SourceError::Shape(
            "expected a JSON array of row objects".into(),
        ));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let Value::Object(obj) = item else {
                return Err(SourceError::Shape(format!(
                    "row {} is not an object",
                    i + 1
                )));
            };
            obj.into_iter()
                .map(|(k, v)| {
                    let raw = match v {
                        Value::Null => RawValue::Null,
                        Value::String(s) => RawValue::Text(s),
                        Value::Bool(b) => RawValue::Text(b.to_string()),
                        Value::Number(n) => n.as_f64().map(RawValue::Number).ok_or_else(|| {
                            SourceError::Shape(format!("number out of range in column '{}'", k))
                        })?,
                        Value::Array(_) | Value::Object(_) => {
                            return Err(SourceError::Shape(format!(
                                "nested value in column '{}' of row {}",
                                k,
                                i + 1
                            )));
                        }
                    };
                    Ok((k, raw))
                })
                .collect::<Result<Row, SourceError>>()
        })
        .collect()
}
