// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UTC timestamp parsing for API payloads.
//!
//! The cloud API reports timestamps such as the leakage-protection pause end
//! in UTC. Depending on the firmware and endpoint, they may or may not carry
//! an explicit offset.
//!
//! # Supported Formats
//!
//! - RFC 3339 with offset: `"2024-01-15T10:30:00Z"`, `"2024-01-15T10:30:00+01:00"`
//! - ISO 8601 without offset, read as UTC: `"2024-01-15T10:30:00"`
//! - Unix epoch seconds or milliseconds: `"1705318200"`, `"1705318200000"`
//!
//! Calendar helpers used by the consumption periods live here as well.

use chrono::{DateTime, Datelike, Days, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Parses a timestamp string as UTC.
///
/// Returns `None` when no supported format matches.
///
/// # Examples
///
/// ```
/// use biocat_lib::types::parse_utc;
///
/// let a = parse_utc("2024-01-15T10:30:00Z").unwrap();
/// let b = parse_utc("2024-01-15T11:30:00+01:00").unwrap();
/// let c = parse_utc("2024-01-15T10:30:00").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a, c);
/// ```
#[must_use]
pub fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        return parse_epoch(s);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parses a Unix epoch timestamp (seconds or milliseconds).
fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    let timestamp: i64 = s.parse().ok()?;

    // Seconds have at most 10 digits until year 2286
    if timestamp > 9_999_999_999 {
        Utc.timestamp_millis_opt(timestamp).single()
    } else {
        Utc.timestamp_opt(timestamp, 0).single()
    }
}

/// Serde helper for optional timestamps that may be `null`, empty or absent.
///
/// # Errors
///
/// Fails when a non-empty string matches no supported format.
pub(crate) fn deserialize_optional_utc<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_utc(s).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "failed to parse datetime: '{s}' (expected ISO 8601 or Unix epoch)"
            ))
        }),
    }
}

/// Returns midnight (UTC) of the day containing `at`.
#[must_use]
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Returns the Monday midnight (UTC) on or before the day start `day`.
#[must_use]
pub fn start_of_week(day: DateTime<Utc>) -> DateTime<Utc> {
    let back = day.weekday().num_days_from_monday();
    start_of_day(day) - TimeDelta::days(i64::from(back))
}

/// Returns midnight (UTC) of the first day of the month containing `at`.
#[must_use]
pub fn start_of_month(at: DateTime<Utc>) -> DateTime<Utc> {
    let date = at.date_naive() - Days::new(u64::from(at.day0()));
    date.and_time(NaiveTime::MIN).and_utc()
}
