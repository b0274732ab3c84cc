// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{RawValue, Row};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Description,
    Amount,
    Category,
    Type,
    AccountCount,
}

impl Field {
    pub fn aliases(&self) -> &'static [&'static str] {
        FIELD_ALIASES
            .iter()
            .find(|(f, _)| f == self)
            .map(|(_, a)| *a)
            .unwrap_or(&[])
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Description => "description",
            Field::Amount => "amount",
            Field::Category => "category",
            Field::Type => "type",
            Field::AccountCount => "account count",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.aliases().iter().map(|a| format!("'{}'", a)).collect();
        write!(f, "{} ({})", self.label(), quoted.join(", "))
    }
}

/// Column headers accepted for each logical field, in lookup order.
pub const FIELD_ALIASES: &[(Field, &[&str])] = &[
    (Field::Date, &["Vencimento", "Data", "Date"]),
    (Field::Description, &["Sacado", "Descrição", "Description"]),
    (Field::Amount, &["Valor do Título", "Valor", "Amount"]),
    (Field::Category, &["Plano de Contas", "Categoria", "Category"]),
    (Field::Type, &["Tipo", "Type"]),
    (Field::AccountCount, &["Nº de Contas"]),
];

pub const REQUIRED: [Field; 4] = [
    Field::Date,
    Field::Description,
    Field::Amount,
    Field::Category,
];

/// First non-blank value among the field's aliases. Exact header names are
/// tried before a case- and whitespace-insensitive pass.
pub fn resolve<'a>(row: &'a Row, field: Field) -> Option<&'a RawValue> {
    let aliases = field.aliases();
    aliases
        .iter()
        .find_map(|alias| row.get(*alias).filter(|v| !v.is_blank()))
        .or_else(|| {
            aliases.iter().find_map(|alias| {
                let wanted = normalize_header(alias);
                row.iter()
                    .find(|(k, v)| normalize_header(k) == wanted && !v.is_blank())
                    .map(|(_, v)| v)
            })
        })
}

fn normalize_header(h: &str) -> String {
    h.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
