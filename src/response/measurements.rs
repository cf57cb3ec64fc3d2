// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Instantaneous measurement parsing.

use serde::{Deserialize, Serialize};

/// Readings from the `measurements/direct` endpoint.
///
/// # Examples
///
/// ```
/// use biocat_lib::response::MeasurementSnapshot;
///
/// let json = r#"{
///     "waterTemp": 14.2,
///     "pressure": 4.1,
///     "flowRate": 6.5,
///     "lastWaterTapVolume": 2.5,
///     "lastWaterTapDuration": 18
/// }"#;
/// let m: MeasurementSnapshot = serde_json::from_str(json).unwrap();
/// assert!(m.is_flowing());
/// assert_eq!(m.last_tap_duration, 18.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementSnapshot {
    /// Water temperature in °C.
    #[serde(rename = "waterTemp")]
    pub water_temperature: f64,

    /// Water pressure in bar.
    pub pressure: f64,

    /// Current flow rate in L/min.
    pub flow_rate: f64,

    /// Volume of the last tap event in liters.
    #[serde(rename = "lastWaterTapVolume")]
    pub last_tap_volume: f64,

    /// Duration of the last tap event in seconds.
    #[serde(rename = "lastWaterTapDuration")]
    pub last_tap_duration: f64,
}

impl MeasurementSnapshot {
    /// Returns `true` if water is currently flowing.
    #[must_use]
    pub fn is_flowing(&self) -> bool {
        self.flow_rate > 0.0
    }
}
