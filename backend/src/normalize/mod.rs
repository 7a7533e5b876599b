//! Fueling-plan date normalization.
//!
//! Sheet cells arrive as spreadsheet serials, as text in a handful of
//! conflicting conventions, or as error tokens. Everything funnels into
//! [`normalize_date`], which yields a calendar date or `None` (invalid) and
//! never fails.
//!
//! # Rule order
//!
//! 1. Missing, blank or error token (`#N/A`, `#DIV/0!`, `#VALUE!`, `N/A`) - invalid
//! 2. Numeric cell, or text that reads as a number - day serial from
//!    1899-12-30, fraction truncated
//! 3. Text - trimmed, error tokens rejected again
//! 4. Exact patterns with a four-digit year, first match wins:
//!    `MM-DD-YYYY`, `YYYY-MM-DD`, `DD-MM-YYYY`, `DD/MM/YYYY`, `MM/DD/YYYY`,
//!    `DD-Mon-YYYY`, `DD Mon YYYY`
//! 5. Generic fallback (ISO date-times, dotted and slashed ISO, month names,
//!    two-digit years)
//!
//! US `MM-DD-YYYY` is tried before `DD-MM-YYYY`, so `03-04-2025` reads as
//! March 4th. [`analyze_date`] flags such values as ambiguous.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::CellValue;

/// Sheet error tokens that mean "no value".
pub const ERROR_TOKENS: [&str; 4] = ["#N/A", "#DIV/0!", "#VALUE!", "N/A"];

/// Largest serial a spreadsheet can hold (9999-12-31).
pub const MAX_SERIAL: f64 = 2_958_465.0;

/// Exact patterns, in priority order, with a readable label.
pub const DATE_PATTERNS: [(&str, &str); 7] = [
    ("%m-%d-%Y", "MM-DD-YYYY"),
    ("%Y-%m-%d", "YYYY-MM-DD"),
    ("%d-%m-%Y", "DD-MM-YYYY"),
    ("%d/%m/%Y", "DD/MM/YYYY"),
    ("%m/%d/%Y", "MM/DD/YYYY"),
    ("%d-%b-%Y", "DD-Mon-YYYY"),
    ("%d %b %Y", "DD Mon YYYY"),
];

/// Patterns where day and month are both plain numbers.
const NUMERIC_DAY_MONTH: [&str; 4] = ["%m-%d-%Y", "%d-%m-%Y", "%d/%m/%Y", "%m/%d/%Y"];

const FALLBACK_DATETIME_FORMATS: [&str; 9] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
];

const FALLBACK_DATE_FORMATS: [&str; 14] = [
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d-%B-%Y",
    "%d/%b/%Y",
    "%Y-%b-%d",
    "%m/%d/%y",
    "%m-%d-%y",
    "%d-%b-%y",
];

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid ordinal regex"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Which rule produced a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "pattern", rename_all = "snake_case")]
pub enum DateRule {
    /// Numeric day serial.
    Serial,
    /// One of [`DATE_PATTERNS`], by label.
    Pattern(&'static str),
    /// Generic fallback parse.
    Fallback,
}

/// A successfully normalized date and how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateMatch {
    pub date: NaiveDate,
    pub rule: DateRule,
    /// Day and month could be swapped to give another valid date.
    pub ambiguous: bool,
}

/// The serial epoch, 1899-12-30.
pub fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("1899-12-30 is a valid date")
}

/// Normalize a raw cell into a calendar date, `None` when invalid.
pub fn normalize_date(value: &CellValue) -> Option<NaiveDate> {
    analyze_date(value).map(|m| m.date)
}

/// Normalize a raw cell, also reporting the matching rule and ambiguity.
pub fn analyze_date(value: &CellValue) -> Option<DateMatch> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => serial_match(*n),
        CellValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) => serial_match(n),
            Err(_) => parse_date_text(s),
        },
    }
}

fn serial_match(serial: f64) -> Option<DateMatch> {
    from_serial(serial).map(|date| DateMatch {
        date,
        rule: DateRule::Serial,
        ambiguous: false,
    })
}

/// Convert a day serial to a date. Fractions are truncated; negative,
/// non-finite or beyond-9999 serials are invalid.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_SERIAL {
        return None;
    }
    serial_epoch().checked_add_days(Days::new(serial.trunc() as u64))
}

/// Whether `s` (already trimmed) is a sheet error token.
pub fn is_error_token(s: &str) -> bool {
    ERROR_TOKENS.contains(&s)
}

/// Parse date text through the exact patterns, then the fallback.
pub fn parse_date_text(raw: &str) -> Option<DateMatch> {
    let s = raw.trim();
    if s.is_empty() || is_error_token(s) {
        return None;
    }

    for (fmt, label) in DATE_PATTERNS {
        let parsed = NaiveDate::parse_from_str(s, fmt).ok().filter(has_full_year);
        if let Some(date) = parsed {
            let ambiguous = NUMERIC_DAY_MONTH.contains(&fmt) && is_swappable(date);
            return Some(DateMatch {
                date,
                rule: DateRule::Pattern(label),
                ambiguous,
            });
        }
    }

    parse_fallback(s).map(|date| DateMatch {
        date,
        rule: DateRule::Fallback,
        ambiguous: false,
    })
}

/// `%Y` also reads one to three digits; `12-15-25` must not become year 25.
fn has_full_year(date: &NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

/// Day <= 12 and differs from the month: reading it the other way round
/// also gives a real date.
fn is_swappable(date: NaiveDate) -> bool {
    date.day() <= 12 && date.day() != date.month()
}

/// Best-effort parse for anything the exact patterns miss.
fn parse_fallback(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive()).filter(has_full_year);
    }

    let cleaned = ORDINAL_SUFFIX.replace_all(s, "$1");
    let cleaned = WHITESPACE_RUN.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim_end_matches('Z');

    FALLBACK_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDateTime::parse_from_str(cleaned, fmt)
                .ok()
                .map(|dt| dt.date())
                .filter(has_full_year)
        })
        .or_else(|| {
            FALLBACK_DATE_FORMATS.iter().find_map(|fmt| {
                NaiveDate::parse_from_str(cleaned, fmt).ok().filter(has_full_year)
            })
        })
}
