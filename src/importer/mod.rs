// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Statement import: turns loosely shaped spreadsheet rows into transaction
//! drafts. Bad rows never abort the batch; each one is either imported
//! (possibly with adjustments) or skipped, and both cases are reported as a
//! [`Diagnostic`].

pub mod amount;
pub mod dates;
pub mod fields;

use crate::catalog::Catalog;
use crate::models::{RawValue, Row, TransactionDraft, TransactionType};
use crate::source::{self, SourceFormat};
use fields::{Field, REQUIRED};
use serde::Serialize;
use std::fmt;
use std::path::Path;

// Row 1 is the header line of the sheet.
const FIRST_DATA_ROW: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    UnknownType { raw: String },
    MissingType,
    UnknownCategory {
        raw: String,
        r#type: TransactionType,
        assigned: String,
    },
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::UnknownType { raw } => {
                write!(f, "Type '{}' not recognized, defaulted to Expense.", raw)
            }
            Adjustment::MissingType => {
                write!(f, "Type column missing or empty, defaulted to Expense.")
            }
            Adjustment::UnknownCategory {
                raw,
                r#type,
                assigned,
            } => write!(
                f,
                "Category '{}' not found for type {}, assigned to '{}'.",
                raw, r#type, assigned
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    MissingFields { row: usize, fields: Vec<String> },
    InvalidDate { row: usize, raw: String },
    InvalidAmount { row: usize, raw: String },
    Adjusted { row: usize, adjustments: Vec<Adjustment> },
    EmptySource,
    Unreadable { reason: String },
}

impl Diagnostic {
    pub fn row(&self) -> Option<usize> {
        match self {
            Diagnostic::MissingFields { row, .. }
            | Diagnostic::InvalidDate { row, .. }
            | Diagnostic::InvalidAmount { row, .. }
            | Diagnostic::Adjusted { row, .. } => Some(*row),
            Diagnostic::EmptySource | Diagnostic::Unreadable { .. } => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Diagnostic::MissingFields { .. }
                | Diagnostic::InvalidDate { .. }
                | Diagnostic::InvalidAmount { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingFields { row, fields } => write!(
                f,
                "Row {}: skipped. Required data not found: {}.",
                row,
                fields.join("; ")
            ),
            Diagnostic::InvalidDate { row, raw } => write!(
                f,
                "Row {}: skipped. Invalid date '{}' (tried {}).",
                row,
                raw,
                dates::ATTEMPTED_FORMATS
            ),
            Diagnostic::InvalidAmount { row, raw } => write!(
                f,
                "Row {}: skipped. Invalid or non-positive amount '{}'.",
                row, raw
            ),
            Diagnostic::Adjusted { row, adjustments } => {
                write!(f, "Row {}: imported with adjustments:", row)?;
                for a in adjustments {
                    write!(f, " {}", a)?;
                }
                Ok(())
            }
            Diagnostic::EmptySource => {
                write!(f, "No transactions found; the source is empty.")
            }
            Diagnostic::Unreadable { reason } => {
                write!(f, "Could not read the source as a table: {}", reason)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub transactions: Vec<TransactionDraft>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportOutcome {
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    pub fn skipped(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_skip()).count()
    }

    fn fatal(reason: String) -> Self {
        Self {
            transactions: Vec::new(),
            diagnostics: vec![Diagnostic::Unreadable { reason }],
        }
    }
}

/// Reads `path` and normalizes its rows. A file that cannot be read as a
/// table yields no transactions and a single `Unreadable` diagnostic.
pub fn import_path(path: &Path, format: Option<SourceFormat>, catalog: &Catalog) -> ImportOutcome {
    match source::read_rows(path, format) {
        Ok(rows) => import_rows(&rows, catalog),
        Err(err) => ImportOutcome::fatal(err.to_string()),
    }
}

pub fn import_rows(rows: &[Row], catalog: &Catalog) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();
    for (index, row) in rows.iter().enumerate() {
        let row_number = index + FIRST_DATA_ROW;
        match normalize_row(row, row_number, catalog) {
            Ok((draft, adjustments)) => {
                if !adjustments.is_empty() {
                    outcome.diagnostics.push(Diagnostic::Adjusted {
                        row: row_number,
                        adjustments,
                    });
                }
                outcome.transactions.push(draft);
            }
            Err(skip) => outcome.diagnostics.push(skip),
        }
    }
    if outcome.transactions.is_empty() && outcome.diagnostics.is_empty() {
        outcome.diagnostics.push(Diagnostic::EmptySource);
    }
    outcome
}

fn normalize_row(
    row: &Row,
    row_number: usize,
    catalog: &Catalog,
) -> Result<(TransactionDraft, Vec<Adjustment>), Diagnostic> {
    let resolved = REQUIRED.map(|f| fields::resolve(row, f));
    let [
        Some(raw_date),
        Some(raw_description),
        Some(raw_amount),
        Some(raw_category),
    ] = resolved
    else {
        let missing = REQUIRED
            .iter()
            .zip(resolved.iter())
            .filter(|(_, v)| v.is_none())
            .map(|(f, _)| f.to_string())
            .collect();
        return Err(Diagnostic::MissingFields {
            row: row_number,
            fields: missing,
        });
    };

    let mut description = raw_description.to_string().trim().to_string();
    if let Some(count) = fields::resolve(row, Field::AccountCount) {
        description = format!("{} (Nº Contas: {})", description, count.to_string().trim());
    }

    let date = dates::parse_date_value(raw_date).ok_or_else(|| Diagnostic::InvalidDate {
        row: row_number,
        raw: raw_date.to_string(),
    })?;

    let amount = amount::parse_amount_value(raw_amount).ok_or_else(|| Diagnostic::InvalidAmount {
        row: row_number,
        raw: raw_amount.to_string(),
    })?;

    let mut adjustments = Vec::new();
    let r#type = resolve_type(fields::resolve(row, Field::Type), &mut adjustments);

    let wanted = raw_category.to_string().trim().to_string();
    let category = match catalog.find(&wanted, r#type) {
        Some(c) => c.name.clone(),
        None => {
            let assigned = catalog.fallback(r#type).to_string();
            adjustments.push(Adjustment::UnknownCategory {
                raw: wanted,
                r#type,
                assigned: assigned.clone(),
            });
            assigned
        }
    };

    Ok((
        TransactionDraft {
            date,
            description,
            amount,
            r#type,
            category,
        },
        adjustments,
    ))
}

fn resolve_type(raw: Option<&RawValue>, adjustments: &mut Vec<Adjustment>) -> TransactionType {
    let Some(raw) = raw else {
        adjustments.push(Adjustment::MissingType);
        return TransactionType::Expense;
    };
    match raw.to_string().trim().to_lowercase().as_str() {
        "receita" | "income" => TransactionType::Income,
        "despesa" | "expense" => TransactionType::Expense,
        _ => {
            adjustments.push(Adjustment::UnknownType {
                raw: raw.to_string(),
            });
            TransactionType::Expense
        }
    }
}
