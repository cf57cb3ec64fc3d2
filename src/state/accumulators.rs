// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rolling consumption totals.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{start_of_day, start_of_month, start_of_week};

/// A consumption period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Resets at midnight UTC.
    Daily,
    /// Resets on Monday midnight UTC.
    Weekly,
    /// Resets on the first of the month, checked 31 days after the last reset.
    Monthly,
}

impl PeriodKind {
    /// All periods in rollover order.
    pub const ALL: [Self; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    /// Time after the period start at which a rollover is due.
    #[must_use]
    pub fn length(self) -> TimeDelta {
        match self {
            Self::Daily => TimeDelta::hours(24),
            Self::Weekly => TimeDelta::days(7),
            // Fixed length; drifts against 28-30 day months
            Self::Monthly => TimeDelta::days(31),
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

/// Running total for one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotal {
    /// Liters consumed since `started_at`.
    pub total: f64,
    /// Start of the current period (UTC).
    pub started_at: DateTime<Utc>,
}

impl PeriodTotal {
    const fn starting_at(started_at: DateTime<Utc>) -> Self {
        Self {
            total: 0.0,
            started_at,
        }
    }

    fn is_due(&self, kind: PeriodKind, now: DateTime<Utc>) -> bool {
        now >= self.started_at + kind.length()
    }
}

/// Which periods were reset by a call to
/// [`roll_over`](ConsumptionAccumulators::roll_over).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rollover {
    /// The daily total was reset.
    pub daily: bool,
    /// The weekly total was reset.
    pub weekly: bool,
    /// The monthly total was reset.
    pub monthly: bool,
}

impl Rollover {
    /// Returns `true` if any period was reset.
    #[must_use]
    pub fn any(&self) -> bool {
        self.daily || self.weekly || self.monthly
    }

    /// Returns the periods that were reset, in rollover order.
    #[must_use]
    pub fn periods(&self) -> Vec<PeriodKind> {
        PeriodKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                PeriodKind::Daily => self.daily,
                PeriodKind::Weekly => self.weekly,
                PeriodKind::Monthly => self.monthly,
            })
            .collect()
    }
}

/// Daily, weekly and monthly consumption totals.
///
/// Each total is paired with the start of its current period. A total is
/// reset to zero exactly once when its period has elapsed, and never in the
/// middle of a period.
///
/// # Examples
///
/// ```
/// use biocat_lib::state::{ConsumptionAccumulators, PeriodKind};
/// use biocat_lib::types::parse_utc;
///
/// let start = parse_utc("2024-03-14T09:00:00Z").unwrap();
/// let mut acc = ConsumptionAccumulators::new(start);
/// acc.add(12.5);
/// assert_eq!(acc.total(PeriodKind::Daily), 12.5);
///
/// // Next morning the daily total starts over
/// let rolled = acc.roll_over(parse_utc("2024-03-15T07:00:00Z").unwrap());
/// assert!(rolled.daily);
/// assert_eq!(acc.total(PeriodKind::Daily), 0.0);
/// assert_eq!(acc.total(PeriodKind::Weekly), 12.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionAccumulators {
    daily: PeriodTotal,
    weekly: PeriodTotal,
    monthly: PeriodTotal,
}

impl ConsumptionAccumulators {
    /// Creates zeroed totals whose periods contain `now`.
    ///
    /// Period starts are floored to midnight, the preceding Monday and the
    /// first of the month (all UTC).
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        let day = start_of_day(now);
        Self::with_period_starts(day, start_of_week(day), start_of_month(now))
    }

    /// Creates zeroed totals with explicit period starts.
    #[must_use]
    pub fn with_period_starts(
        daily: DateTime<Utc>,
        weekly: DateTime<Utc>,
        monthly: DateTime<Utc>,
    ) -> Self {
        Self {
            daily: PeriodTotal::starting_at(daily),
            weekly: PeriodTotal::starting_at(weekly),
            monthly: PeriodTotal::starting_at(monthly),
        }
    }

    /// Returns the running total for a period.
    #[must_use]
    pub fn total(&self, kind: PeriodKind) -> f64 {
        self.period(kind).total
    }

    /// Returns the start of the current period.
    #[must_use]
    pub fn period_start(&self, kind: PeriodKind) -> DateTime<Utc> {
        self.period(kind).started_at
    }

    /// Returns the total and start for a period.
    #[must_use]
    pub fn period(&self, kind: PeriodKind) -> &PeriodTotal {
        match kind {
            PeriodKind::Daily => &self.daily,
            PeriodKind::Weekly => &self.weekly,
            PeriodKind::Monthly => &self.monthly,
        }
    }

    /// Resets every period that has elapsed at `now`.
    ///
    /// Periods are checked in order daily, weekly, monthly. A new weekly
    /// period starts on the Monday of the (possibly just reset) daily period.
    pub fn roll_over(&mut self, now: DateTime<Utc>) -> Rollover {
        let mut rolled = Rollover::default();

        if self.daily.is_due(PeriodKind::Daily, now) {
            self.daily = PeriodTotal::starting_at(start_of_day(now));
            rolled.daily = true;
        }

        if self.weekly.is_due(PeriodKind::Weekly, now) {
            self.weekly = PeriodTotal::starting_at(start_of_week(self.daily.started_at));
            rolled.weekly = true;
        }

        if self.monthly.is_due(PeriodKind::Monthly, now) {
            self.monthly = PeriodTotal::starting_at(start_of_month(now));
            rolled.monthly = true;
        }

        rolled
    }

    /// Adds a consumption delta to all three totals.
    ///
    /// The delta is applied as given; a negative delta lowers the totals.
    pub fn add(&mut self, delta: f64) {
        self.daily.total += delta;
        self.weekly.total += delta;
        self.monthly.total += delta;
    }
}
