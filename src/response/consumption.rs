// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cumulative consumption parsing.

use crate::error::ParseError;

/// Parses the cumulative consumption payload into liters.
///
/// The endpoint answers with bare numeric text. Depending on the account
/// locale the decimal separator is either `.` or `,`; both are accepted.
/// Surrounding whitespace and JSON string quotes are ignored.
///
/// # Errors
///
/// Returns `ParseError::InvalidNumber` if the payload is not a finite number.
///
/// # Examples
///
/// ```
/// use biocat_lib::response::parse_cumulative;
///
/// assert_eq!(parse_cumulative("123.45").unwrap(), 123.45);
/// assert_eq!(parse_cumulative("123,45").unwrap(), 123.45);
/// assert_eq!(parse_cumulative("\"98,5\"\n").unwrap(), 98.5);
/// assert!(parse_cumulative("n/a").is_err());
/// ```
pub fn parse_cumulative(body: &str) -> Result<f64, ParseError> {
    let trimmed = body.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();

    let normalized = unquoted.replace(',', ".");

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::InvalidNumber(body.to_string())),
    }
}
