// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::RawValue;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Formats tried, in order, when reporting an unparseable date.
pub const ATTEMPTED_FORMATS: &str =
    "spreadsheet serial, YYYY-MM-DD, ISO 8601 date-time, DD/MM/YYYY, MM/DD/YYYY";

/// Two-digit years up to and including this value land in the 2000s.
pub const YEAR_PIVOT: i32 = 70;

// Largest serial a spreadsheet accepts (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

pub fn parse_date_value(v: &RawValue) -> Option<NaiveDate> {
    match v {
        RawValue::Date(d) => Some(*d),
        RawValue::Number(n) => from_serial(*n),
        RawValue::Text(s) => parse_date_text(s),
        RawValue::Null => None,
    }
}

/// Converts a 1900-system spreadsheet serial. Serial 60 is the phantom
/// 1900-02-29, which rolls over to 1900-03-01 like the calendar it emulates.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.floor() as i64;
    let (epoch, offset) = if days < 60 {
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, days)
    } else {
        (NaiveDate::from_ymd_opt(1899, 12, 30)?, days.max(61))
    };
    epoch.checked_add_signed(Duration::days(offset))
}

pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    parse_iso(s).or_else(|| parse_split(s))
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    // chrono's %Y would happily read "01/02/03" as year 1
    let leading_digits = s.chars().take_while(char::is_ascii_digit).count();
    if leading_digits != 4 {
        return None;
    }
    if let Some(d) = ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// `a/b/y` or `a-b-y`: day-month-year first, then month-day-year.
fn parse_split(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split(['/', '-']).map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let a: u32 = parts[0].parse().ok()?;
    let b: u32 = parts[1].parse().ok()?;
    let year = expand_year(parts[2].parse().ok()?);
    NaiveDate::from_ymd_opt(year, b, a).or_else(|| NaiveDate::from_ymd_opt(year, a, b))
}

pub fn expand_year(y: i32) -> i32 {
    match y {
        0..=YEAR_PIVOT => 2000 + y,
        71..=99 => 1900 + y,
        _ => y,
    }
}
