//! Date normalization shared by the index builder, the repository and the
//! metadata normalizer.
//!
//! Two entry points:
//! - [`normalize_date`] turns a raw front matter value into `YYYY-MM-DD`, or
//!   `None` when nothing sensible can be read from it.
//! - [`summary_date`] turns a stored date string into a concrete calendar
//!   date, reporting why it had to fall back to the Unix epoch.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_yaml::Value;
use std::fmt;
use std::sync::OnceLock;

/// Output format of normalized dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static STRICT_DATE: OnceLock<Regex> = OnceLock::new();
static LOOSE_DATE: OnceLock<Regex> = OnceLock::new();

fn strict_date_regex() -> &'static Regex {
    STRICT_DATE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
}

// year, month, optional day, optional wall-clock time (ignored)
fn loose_date_regex() -> &'static Regex {
    LOOSE_DATE.get_or_init(|| {
        Regex::new(
            r"^(\d{4})[-/.]?(\d{1,2})(?:[-/.]?(\d{1,2}))?(?:[Tt ]+\d{1,2}(?::\d{1,2}){0,2}(?:\.\d+)?)?$",
        )
        .unwrap()
    })
}

const TEXTUAL_FORMATS: &[&str] = &[
    "%Y年%m月%d日",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// 1970-01-01, used for documents without a usable date
pub fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Parse `YYYY-MM-DD` exactly, as a calendar date (no time zone involved)
pub fn parse_strict(raw: &str) -> Option<NaiveDate> {
    if !strict_date_regex().is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Best-effort parse of a free-form date string.
///
/// Accepts `2024-1-5`, `2024/01/05`, `20240105`, `2024-01` (first of month),
/// date-times with or without offsets (RFC 3339 / RFC 2822; the calendar date
/// is taken in the value's own offset), and a few textual forms such as
/// `January 5, 2024` or `2024年1月5日`.
pub fn parse_loose(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(date) = parse_strict(raw) {
        return Some(date);
    }

    if let Some(caps) = loose_date_regex().captures(raw) {
        let year = caps.get(1)?.as_str().parse().ok()?;
        let month = caps.get(2)?.as_str().parse().ok()?;
        let day = caps.get(3).map_or(Some(1), |d| d.as_str().parse().ok())?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }

    TEXTUAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Normalize a raw front matter date value to `YYYY-MM-DD`.
///
/// Numbers are read as millisecond Unix timestamps.
pub fn normalize_date(value: &Value) -> Option<String> {
    let date = match value {
        Value::String(s) => parse_loose(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        Value::Tagged(tagged) => return normalize_date(&tagged.value),
        _ => None,
    }?;
    Some(date.format(DATE_FORMAT).to_string())
}

/// Why a document's listing date fell back to the epoch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateIssue {
    Missing,
    Invalid(String),
}

impl DateIssue {
    pub fn code(&self) -> &'static str {
        match self {
            DateIssue::Missing => crate::models::codes::DATE_MISSING,
            DateIssue::Invalid(_) => crate::models::codes::DATE_INVALID,
        }
    }
}

impl fmt::Display for DateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateIssue::Missing => write!(f, "missing date"),
            DateIssue::Invalid(raw) => write!(f, "invalid date format: {raw}"),
        }
    }
}

/// Resolve the listing date of a document.
///
/// Strict `YYYY-MM-DD` strings are taken as that calendar date; anything else
/// goes through [`parse_loose`]. Failures yield the issue so the caller can
/// warn and substitute [`epoch`].
pub fn summary_date(raw: Option<&str>) -> Result<NaiveDate, DateIssue> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Err(DateIssue::Missing),
        Some(raw) => raw,
    };

    parse_strict(raw)
        .or_else(|| parse_loose(raw))
        .ok_or_else(|| DateIssue::Invalid(raw.to_string()))
}

/// [`summary_date`] for a raw front matter value
pub fn summary_date_from_value(value: Option<&Value>) -> Result<NaiveDate, DateIssue> {
    match value {
        None | Some(Value::Null) => Err(DateIssue::Missing),
        Some(Value::String(s)) => summary_date(Some(s)),
        Some(other) => normalize_date(other)
            .and_then(|s| parse_strict(&s))
            .ok_or_else(|| DateIssue::Invalid(raw_date_text(other))),
    }
}

/// Text of a date value as the author wrote it, for comparisons and messages
pub fn raw_date_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Tagged(tagged) => raw_date_text(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
