//! Timestamp normalization for store-provided date strings.
//!
//! Stores disagree on date shapes: the App Store feeds carry ISO-8601 with a
//! local offset, Play exposes epoch seconds, and hand-made fixtures or CSV
//! re-imports often drop the seconds or the zone entirely. Every shape is
//! resolved to UTC; input without a zone is taken to already be UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::DateError;

type Parser = fn(&str) -> Option<DateTime<Utc>>;

/// Formats in priority order. The first parser that accepts the input wins.
const PARSERS: &[(&str, Parser)] = &[
    ("rfc3339_utc", parse_rfc3339_utc),
    ("rfc3339_offset", parse_rfc3339_offset),
    ("iso_minutes_zoned", parse_iso_minutes_zoned),
    ("naive_seconds", parse_naive_seconds),
    ("naive_minutes", parse_naive_minutes),
    ("date_only", parse_date_only),
    ("epoch_seconds", parse_epoch_seconds),
];

/// Parses a store timestamp into UTC.
///
/// # Errors
///
/// Returns [`DateError::Unparseable`] carrying the original input when no
/// known format matches. No default timestamp is ever substituted.
pub fn normalize(raw: &str) -> Result<DateTime<Utc>, DateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DateError::Unparseable(raw.to_owned()));
    }

    PARSERS
        .iter()
        .find_map(|(_, parse)| parse(trimmed))
        .ok_or_else(|| DateError::Unparseable(raw.to_owned()))
}

/// Name of the first format that accepts `raw`, for diagnostics.
#[must_use]
pub fn detect_format(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    PARSERS
        .iter()
        .find(|(_, parse)| parse(trimmed).is_some())
        .map(|(name, _)| *name)
}

fn parse_rfc3339_utc(s: &str) -> Option<DateTime<Utc>> {
    if !s.ends_with(['Z', 'z']) {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_rfc3339_offset(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_iso_minutes_zoned(s: &str) -> Option<DateTime<Utc>> {
    if let Some(naive) = s.strip_suffix(['Z', 'z']) {
        return NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M")
            .ok()
            .map(|dt| Utc.from_utc_datetime(&dt));
    }
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive_seconds(s: &str) -> Option<DateTime<Utc>> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| Utc.from_utc_datetime(&dt))
}

fn parse_naive_minutes(s: &str) -> Option<DateTime<Utc>> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| Utc.from_utc_datetime(&dt))
}

fn parse_date_only(s: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}

fn parse_epoch_seconds(s: &str) -> Option<DateTime<Utc>> {
    if !(9..=11).contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}
