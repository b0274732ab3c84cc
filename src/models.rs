// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
            TransactionType::Transfer => "Transfer",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for TransactionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Ok(TransactionType::Income),
            "expense" | "despesa" => Ok(TransactionType::Expense),
            "transfer" | "transferência" | "transferencia" => Ok(TransactionType::Transfer),
            _ => Err(ParseEnumError {
                kind: "transaction type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
    Cash,
    Investment,
    Loan,
    Other,
}

impl AccountType {
    /// Balances of these accounts are money owed and count against net worth.
    pub fn is_liability(&self) -> bool {
        matches!(self, AccountType::CreditCard | AccountType::Loan)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::CreditCard => "credit-card",
            AccountType::Cash => "cash",
            AccountType::Investment => "investment",
            AccountType::Loan => "loan",
            AccountType::Other => "other",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_lowercase().replace(['_', ' '], "-");
        match t.as_str() {
            "checking" | "corrente" => Ok(AccountType::Checking),
            "savings" | "poupança" | "poupanca" => Ok(AccountType::Savings),
            "credit-card" | "creditcard" | "cartão-de-crédito" | "cartao-de-credito" => {
                Ok(AccountType::CreditCard)
            }
            "cash" | "dinheiro" | "dinheiro-físico" | "dinheiro-fisico" => Ok(AccountType::Cash),
            "investment" | "investimento" => Ok(AccountType::Investment),
            "loan" | "empréstimo" | "emprestimo" => Ok(AccountType::Loan),
            "other" | "outro" => Ok(AccountType::Other),
            _ => Err(ParseEnumError {
                kind: "account type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub r#type: AccountType,
    pub initial_balance: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub bank_name: Option<String>,
    pub account_number_last4: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub r#type: TransactionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal, // always positive; direction lives in `type`
    pub r#type: TransactionType,
    pub category: String,
    pub account_id: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub imported: bool,
    #[serde(default)]
    pub is_recurring_instance: bool,
    pub peer_transaction_id: Option<String>,
}

/// A transaction produced by the importer before the caller picks an id and a
/// target account for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub category: String,
}

impl TransactionDraft {
    pub fn into_transaction(self, id: String, account_id: &str) -> Transaction {
        Transaction {
            id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            r#type: self.r#type,
            category: self.category,
            account_id: account_id.to_string(),
            notes: None,
            imported: true,
            is_recurring_instance: false,
            peer_transaction_id: None,
        }
    }
}

/// A single cell as handed over by a spreadsheet reader.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Date(NaiveDate),
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => Ok(()),
            RawValue::Date(d) => write!(f, "{}", d),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(d: NaiveDate) -> Self {
        RawValue::Date(d)
    }
}

/// One source row, keyed by the column header exactly as it appeared.
pub type Row = BTreeMap<String, RawValue>;
