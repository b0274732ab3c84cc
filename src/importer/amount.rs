// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::RawValue;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

static CURRENCY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:R\$|US\$|\$|€|£)\s*").expect("currency prefix pattern is valid")
});

/// Positive amount rounded to cents, or `None` when the value is unusable.
pub fn parse_amount_value(v: &RawValue) -> Option<Decimal> {
    let parsed = match v {
        RawValue::Number(n) => Decimal::try_from(*n).ok()?,
        RawValue::Text(s) => parse_amount_text(s)?,
        RawValue::Date(_) | RawValue::Null => return None,
    };
    positive_cents(parsed)
}

/// Rounds to cents, half away from zero.
pub fn round_cents(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `d` rounded to cents, or `None` when nothing positive is left.
pub fn positive_cents(d: Decimal) -> Option<Decimal> {
    let cents = round_cents(d);
    (cents > Decimal::ZERO).then_some(cents)
}

/// Accepts `12,50`, `12.50`, `1.234,56`, `1,234.56` and an optional leading
/// currency symbol. When both separators appear the last one is the decimal
/// mark.
pub fn parse_amount_text(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let s = CURRENCY_PREFIX.replace(trimmed, "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(c), Some(p)) if c > p => s.replace('.', "").replacen(',', ".", 1),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replacen(',', ".", 1),
        _ => s.to_string(),
    };
    Decimal::from_str(&normalized).ok()
}
