// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Poll interval for the refresh coordinator.

use std::fmt;
use std::time::Duration;

use crate::error::ValueError;

/// Shortest accepted poll interval in seconds.
const POLL_MIN_SECS: u16 = 2;

/// Longest accepted poll interval in seconds (one hour).
const POLL_MAX_SECS: u16 = 3600;

/// Default poll interval in seconds.
const POLL_DEFAULT_SECS: u16 = 60;

/// How often the coordinator refreshes from the cloud API.
///
/// Valid range: 2 seconds to 3600 seconds. Defaults to 60 seconds.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use biocat_lib::types::PollInterval;
///
/// let interval = PollInterval::from_secs(30).unwrap();
/// assert_eq!(interval.as_duration(), Duration::from_secs(30));
///
/// assert_eq!(PollInterval::default().seconds(), 60);
/// assert!(PollInterval::from_secs(1).is_err());
/// assert!(PollInterval::from_secs(3601).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u64", into = "u64")]
pub struct PollInterval(u16);

impl PollInterval {
    /// Shortest poll interval.
    pub const MIN: Duration = Duration::from_secs(POLL_MIN_SECS as u64);

    /// Longest poll interval.
    pub const MAX: Duration = Duration::from_secs(POLL_MAX_SECS as u64);

    /// Creates a poll interval from whole seconds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `secs` is outside [2, 3600].
    pub fn from_secs(secs: u64) -> Result<Self, ValueError> {
        if secs < u64::from(POLL_MIN_SECS) || secs > u64::from(POLL_MAX_SECS) {
            return Err(ValueError::OutOfRange {
                min: u64::from(POLL_MIN_SECS),
                max: u64::from(POLL_MAX_SECS),
                actual: secs,
            });
        }

        // Truncation is safe: the range check above bounds secs to 3600
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(secs as u16))
    }

    /// Creates a poll interval from a duration, rounded to the nearest second.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the rounded duration is outside
    /// [2, 3600] seconds.
    pub fn new(duration: Duration) -> Result<Self, ValueError> {
        // Sign loss is safe: Duration is always non-negative
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let secs = duration.as_secs_f64().round() as u64;
        Self::from_secs(secs)
    }

    /// Returns the interval as a duration.
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0 as u64)
    }

    /// Returns the interval in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u16 {
        self.0
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self(POLL_DEFAULT_SECS)
    }
}

impl fmt::Display for PollInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl TryFrom<u64> for PollInterval {
    type Error = ValueError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl From<PollInterval> for u64 {
    fn from(interval: PollInterval) -> Self {
        u64::from(interval.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(PollInterval::from_secs(2).unwrap().seconds(), 2);
        assert_eq!(PollInterval::from_secs(3600).unwrap().seconds(), 3600);
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert_eq!(
            PollInterval::from_secs(1),
            Err(ValueError::OutOfRange {
                min: 2,
                max: 3600,
                actual: 1
            })
        );
        assert!(PollInterval::from_secs(3601).is_err());
        assert!(PollInterval::from_secs(0).is_err());
    }

    #[test]
    fn rounds_durations() {
        let interval = PollInterval::new(Duration::from_millis(2600)).unwrap();
        assert_eq!(interval.seconds(), 3);

        assert!(PollInterval::new(Duration::from_millis(1400)).is_err());
    }

    #[test]
    fn default_is_one_minute() {
        assert_eq!(PollInterval::default().as_duration(), Duration::from_secs(60));
    }

    #[test]
    fn display_format() {
        assert_eq!(PollInterval::from_secs(90).unwrap().to_string(), "90s");
    }

    #[test]
    fn deserializes_from_seconds() {
        let interval: PollInterval = serde_json::from_str("120").unwrap();
        assert_eq!(interval.seconds(), 120);
        assert!(serde_json::from_str::<PollInterval>("5000").is_err());
    }
}
