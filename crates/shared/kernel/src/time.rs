//! Time stamps as stored and served: RFC 3339 in UTC with second precision.
//!
//! The fixed width keeps lexical order equal to chronological order, so stored
//! strings can be sorted and range-filtered directly.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `2026-10-16T08:30:00Z`
#[must_use]
pub fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[must_use]
pub fn now_stamp() -> String {
    stamp(now())
}

/// Parses a stored stamp; `None` for anything that is not RFC 3339.
#[must_use]
pub fn parse(stamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(stamp).ok().map(|at| at.with_timezone(&Utc))
}

/// `2026-10-16`
#[must_use]
pub fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[must_use]
pub fn today() -> NaiveDate {
    now().date_naive()
}
