// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merged output of one refresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::response::{DeviceState, MeasurementSnapshot};

use super::{ConsumptionAccumulators, PeriodKind};

/// Everything known after one successful refresh.
///
/// A snapshot is never modified after it is built. The next refresh
/// produces a new snapshot that replaces it as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the refresh completed (UTC).
    pub taken_at: DateTime<Utc>,
    /// Cumulative consumption reported by the appliance, in liters.
    pub cumulative_consumption: f64,
    /// Daily, weekly and monthly totals after this refresh.
    pub consumption: ConsumptionAccumulators,
    /// Device state at refresh time.
    pub state: DeviceState,
    /// Instantaneous measurements at refresh time.
    pub measurements: MeasurementSnapshot,
}

impl Snapshot {
    /// Liters consumed since midnight UTC.
    #[must_use]
    pub fn daily_consumption(&self) -> f64 {
        self.consumption.total(PeriodKind::Daily)
    }

    /// Liters consumed since Monday midnight UTC.
    #[must_use]
    pub fn weekly_consumption(&self) -> f64 {
        self.consumption.total(PeriodKind::Weekly)
    }

    /// Liters consumed since the start of the monthly period.
    #[must_use]
    pub fn monthly_consumption(&self) -> f64 {
        self.consumption.total(PeriodKind::Monthly)
    }

    /// Returns `true` if leakage protection was paused when the snapshot was taken.
    #[must_use]
    pub fn is_leakage_protection_paused(&self) -> bool {
        self.state.is_leakage_protection_paused(self.taken_at)
    }
}
