// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived views over a ledger snapshot: balances, net worth, dashboard
//! summary, category breakdowns, monthly series and period statements.
//!
//! Every function here is pure. Callers that care about "this month" pass the
//! current date in explicitly.

use crate::models::{Account, Category, Transaction, TransactionType};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

const MONTHLY_BUCKETS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    pub account: Account,
    pub current_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub income_this_month: Decimal,
    pub expenses_this_month: Decimal,
    pub savings_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

pub fn account_balances(accounts: &[Account], transactions: &[Transaction]) -> Vec<AccountBalance> {
    let mut movements: HashMap<&str, Decimal> = HashMap::new();
    for t in transactions {
        let delta = match t.r#type {
            TransactionType::Income => t.amount,
            TransactionType::Expense => -t.amount,
            TransactionType::Transfer => continue,
        };
        *movements.entry(t.account_id.as_str()).or_insert(Decimal::ZERO) += delta;
    }

    let mut out: Vec<AccountBalance> = accounts
        .iter()
        .map(|a| {
            let moved = movements.get(a.id.as_str()).copied().unwrap_or(Decimal::ZERO);
            AccountBalance {
                account: a.clone(),
                current_balance: a.initial_balance + moved,
            }
        })
        .collect();
    out.sort_by(|a, b| collate(&a.account.name, &b.account.name));
    out
}

pub fn net_worth(balances: &[AccountBalance]) -> Decimal {
    balances.iter().fold(Decimal::ZERO, |acc, b| {
        if b.account.r#type.is_liability() {
            acc - b.current_balance
        } else {
            acc + b.current_balance
        }
    })
}

/// Plain sum of current balances, without the liability sign flip.
pub fn total_balance(balances: &[AccountBalance]) -> Decimal {
    balances.iter().map(|b| b.current_balance).sum()
}

pub fn summary(transactions: &[Transaction], today: NaiveDate) -> Summary {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut income_this_month = Decimal::ZERO;
    let mut expenses_this_month = Decimal::ZERO;

    for t in transactions {
        let this_month = t.date.year() == today.year() && t.date.month() == today.month();
        match t.r#type {
            TransactionType::Income => {
                total_income += t.amount;
                if this_month {
                    income_this_month += t.amount;
                }
            }
            TransactionType::Expense => {
                total_expenses += t.amount;
                if this_month {
                    expenses_this_month += t.amount;
                }
            }
            TransactionType::Transfer => {}
        }
    }

    let balance = total_income - total_expenses;
    let savings_rate = if total_income > Decimal::ZERO {
        balance / total_income * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    Summary {
        total_income,
        total_expenses,
        balance,
        income_this_month,
        expenses_this_month,
        savings_rate,
    }
}

pub fn expense_by_category(
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<CategoryTotal> {
    let mut items =
        category_totals(transactions.iter(), categories, TransactionType::Expense);
    // stable: equal totals keep catalog order
    items.sort_by(|a, b| b.total.cmp(&a.total));
    items
}

pub fn monthly_overview(transactions: &[Transaction]) -> Vec<MonthlyBucket> {
    let mut map: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.r#type != TransactionType::Transfer) {
        let entry = map
            .entry((t.date.year(), t.date.month()))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        if t.r#type == TransactionType::Income {
            entry.0 += t.amount;
        } else {
            entry.1 += t.amount;
        }
    }

    let skip = map.len().saturating_sub(MONTHLY_BUCKETS);
    map.into_iter()
        .skip(skip)
        .map(|((year, month), (income, expenses))| MonthlyBucket {
            year,
            month,
            label: month_label(year, month),
            income,
            expenses,
        })
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{:04}-{:02}", year, month))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    CurrentMonth,
    LastMonth,
    CurrentQuarter,
    LastQuarter,
    CurrentYear,
    LastYear,
}

impl FromStr for Period {
    type Err = crate::models::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "current-month" => Ok(Period::CurrentMonth),
            "last-month" => Ok(Period::LastMonth),
            "current-quarter" => Ok(Period::CurrentQuarter),
            "last-quarter" => Ok(Period::LastQuarter),
            "current-year" => Ok(Period::CurrentYear),
            "last-year" => Ok(Period::LastYear),
            _ => Err(crate::models::ParseEnumError {
                kind: "period",
                value: s.to_string(),
            }),
        }
    }
}

impl Period {
    /// Inclusive first and last day of the period relative to `today`.
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let y = today.year();
        let m0 = today.month0() as i32;
        let (start_m0, months) = match self {
            Period::CurrentMonth => (y * 12 + m0, 1),
            Period::LastMonth => (y * 12 + m0 - 1, 1),
            Period::CurrentQuarter => (y * 12 + m0 / 3 * 3, 3),
            Period::LastQuarter => (y * 12 + m0 / 3 * 3 - 3, 3),
            Period::CurrentYear => (y * 12, 12),
            Period::LastYear => ((y - 1) * 12, 12),
        };
        let start = first_of_month(start_m0);
        let end = first_of_month(start_m0 + months)
            .pred_opt()
            .unwrap_or(NaiveDate::MAX);
        (start, end)
    }
}

// `index` counts months since year 0 (year * 12 + zero-based month).
fn first_of_month(index: i32) -> NaiveDate {
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeStatement {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: Vec<CategoryTotal>,
    pub total_income: Decimal,
    pub expenses: Vec<CategoryTotal>,
    pub total_expenses: Decimal,
    pub net_result: Decimal,
}

pub fn income_statement(
    transactions: &[Transaction],
    categories: &[Category],
    period: Period,
    today: NaiveDate,
) -> IncomeStatement {
    let (start, end) = period.bounds(today);
    let in_period = || {
        transactions
            .iter()
            .filter(move |t| t.date >= start && t.date <= end)
    };
    let income = category_totals(in_period(), categories, TransactionType::Income);
    let expenses = category_totals(in_period(), categories, TransactionType::Expense);
    let total_income: Decimal = income.iter().map(|c| c.total).sum();
    let total_expenses: Decimal = expenses.iter().map(|c| c.total).sum();
    IncomeStatement {
        start,
        end,
        income,
        total_income,
        expenses,
        total_expenses,
        net_result: total_income - total_expenses,
    }
}

/// Per-category totals of type `t`, in catalog order, skipping empty ones.
fn category_totals<'a>(
    transactions: impl Iterator<Item = &'a Transaction>,
    categories: &[Category],
    t: TransactionType,
) -> Vec<CategoryTotal> {
    let mut sums: HashMap<&str, Decimal> = HashMap::new();
    for tx in transactions.filter(|tx| tx.r#type == t) {
        *sums.entry(tx.category.as_str()).or_insert(Decimal::ZERO) += tx.amount;
    }
    categories
        .iter()
        .filter(|c| c.r#type == t)
        .filter_map(|c| {
            let total = sums.get(c.name.as_str()).copied()?;
            (total > Decimal::ZERO).then(|| CategoryTotal {
                name: c.name.clone(),
                total,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub r#type: Option<TransactionType>,
    pub account_id: Option<String>,
    pub search: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Transactions matching every set criterion, newest first.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    accounts: &[Account],
    filter: &TransactionFilter,
) -> Vec<&'a Transaction> {
    let names: HashMap<&str, String> = accounts
        .iter()
        .map(|a| (a.id.as_str(), a.name.to_lowercase()))
        .collect();
    let needle = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();

    let mut out: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| filter.r#type.is_none_or(|ty| t.r#type == ty))
        .filter(|t| {
            filter
                .account_id
                .as_deref()
                .is_none_or(|id| t.account_id == id)
        })
        .filter(|t| filter.start.is_none_or(|d| t.date >= d))
        .filter(|t| filter.end.is_none_or(|d| t.date <= d))
        .filter(|t| {
            if needle.is_empty() {
                return true;
            }
            let account = names.get(t.account_id.as_str()).map(String::as_str).unwrap_or("");
            t.description.to_lowercase().contains(&needle)
                || t.category.to_lowercase().contains(&needle)
                || account.contains(&needle)
        })
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}

pub fn account_in_use(account_id: &str, transactions: &[Transaction]) -> bool {
    transactions.iter().any(|t| t.account_id == account_id)
}

/// Name ordering for Portuguese and Spanish text. Names compare with Latin-1
/// vowel accents, `ç` and `ñ` folded and case ignored, then with accents kept,
/// then lowercase before uppercase. Other scripts compare by code point.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| -> String { s.chars().map(|c| fold_accent(c).to_ascii_lowercase()).collect() };
    let secondary = |s: &str| -> String { s.to_lowercase() };
    primary(a)
        .cmp(&primary(b))
        .then_with(|| secondary(a).cmp(&secondary(b)))
        .then_with(|| {
            // lowercase sorts ahead of uppercase at the last level
            let flip = |s: &str| -> String {
                s.chars()
                    .map(|c| {
                        if c.is_lowercase() {
                            c.to_uppercase().next().unwrap_or(c)
                        } else {
                            c.to_lowercase().next().unwrap_or(c)
                        }
                    })
                    .collect()
            };
            flip(a).cmp(&flip(b))
        })
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        other => other,
    }
}
