//! Date string normalization.
//!
//! Turns a raw date-like string into a calendar date. Two tiers run in order:
//!
//! - **strict**: ISO 8601 dates and date-times (any offset), RFC 2822, and a few
//!   unambiguous numeric layouts.
//! - **lenient**: English month names in prose (`"Posted on November 14, 2025"`),
//!   ordinals, weekday prefixes, and numeric `M/D/YYYY` / `D.M.YYYY`.
//!
//! The lenient tier only accepts short strings, so a date mentioned somewhere in
//! a paragraph is not taken for the date of the page.
//!
//! Only the calendar date is kept. Time of day, offset and zone are dropped, so
//! `2025-11-14T23:30:00-05:00` yields 2025-11-14 (the date as written).

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use pagedate_core::Error;
use regex::Regex;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(\d{4})-(\d{1,2})-(\d{1,2})(?:[t ]\d{1,2}:\d{2}(?::\d{2}(?:[.,]\d+)?)?\s*(?:z|[+-]\d{2}(?::?\d{2})?|utc|gmt)?)?$",
    )
    .expect("valid iso date regex")
});

static SLASHED_YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").expect("valid slashed date regex"));

static COMPACT_YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?:19|20)\d{2})(\d{2})(\d{2})$").expect("valid compact date regex"));

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b{MONTH}\s+(\d{{1,2}})\s+(\d{{4}})\b")).expect("valid month-day-year regex")
});

static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(\d{{1,2}})\s+(?:of\s+)?{MONTH}\s+(\d{{4}})\b")).expect("valid day-month-year regex")
});

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid ordinal regex"));

static EMBEDDED_ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("valid embedded iso regex"));

static NUMERIC_MDY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b").expect("valid numeric mdy regex"));

static DOTTED_DMY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b").expect("valid dotted dmy regex"));

static DOTTED_YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\.(\d{1,2})\.(\d{1,2})\b").expect("valid dotted ymd regex"));

/// Longest input, in characters, the lenient tier will search.
pub const MAX_LENIENT_LEN: usize = 64;

/// Normalize a raw date string to a calendar date.
///
/// # Errors
///
/// Returns `Error::UnparseableDate` when the input is empty or neither tier
/// recognizes it.
pub fn normalize(raw: &str) -> Result<NaiveDate, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::UnparseableDate("empty date string".into()));
    }

    parse_strict(trimmed)
        .or_else(|| parse_lenient(trimmed))
        .ok_or_else(|| Error::UnparseableDate(trimmed.to_string()))
}

/// Structured formats only. Rejects prose.
pub fn parse_strict(s: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(s) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }

    if let Some(caps) = SLASHED_YMD.captures(s).or_else(|| COMPACT_YMD.captures(s)) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    None
}

/// Natural-language and loosely formatted dates, searched anywhere in `s`.
///
/// Returns `None` for input longer than [`MAX_LENIENT_LEN`].
pub fn parse_lenient(s: &str) -> Option<NaiveDate> {
    if s.chars().count() > MAX_LENIENT_LEN {
        return None;
    }

    let lowered = s.to_lowercase().replace(',', " ");
    let cleaned = ORDINAL.replace_all(&lowered, "$1");

    if let Some(caps) = MONTH_DAY_YEAR.captures(&cleaned)
        && let Some(date) = month_number(&caps[1]).and_then(|m| ymd_num(&caps[3], m, &caps[2]))
    {
        return Some(date);
    }

    if let Some(caps) = DAY_MONTH_YEAR.captures(&cleaned)
        && let Some(date) = month_number(&caps[2]).and_then(|m| ymd_num(&caps[3], m, &caps[1]))
    {
        return Some(date);
    }

    if let Some(caps) = EMBEDDED_ISO.captures(&cleaned)
        && let Some(date) = ymd(&caps[1], &caps[2], &caps[3])
    {
        return Some(date);
    }

    if let Some(caps) = DOTTED_YMD.captures(&cleaned)
        && let Some(date) = ymd(&caps[1], &caps[2], &caps[3])
    {
        return Some(date);
    }

    if let Some(caps) = NUMERIC_MDY.captures(&cleaned) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        let (month, day) = if first > 12 { (second, first) } else { (first, second) };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DOTTED_DMY.captures(&cleaned) {
        return ymd(&caps[3], &caps[2], &caps[1]);
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn ymd_num(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
