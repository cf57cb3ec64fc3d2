// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state response parsing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::deserialize_optional_utc;

/// Device state reported by the `state` endpoint.
///
/// Fields are extracted explicitly from the nested payload. A missing
/// required field fails the decode instead of falling back to a default.
///
/// # Examples
///
/// ```
/// use biocat_lib::response::{DeviceState, MicroLeakState};
///
/// let json = r#"{
///     "online": true,
///     "mode": {"id": "WT", "name": "Water tap"},
///     "mlState": "success",
///     "waterProtection": {
///         "absenceModeEnabled": true,
///         "pauseLeakageProtectionUntilUTC": "2024-06-01T08:00:00Z"
///     }
/// }"#;
/// let state: DeviceState = serde_json::from_str(json).unwrap();
/// assert!(state.online);
/// assert_eq!(state.mode_name, "Water tap");
/// assert_eq!(state.micro_leak, MicroLeakState::Success);
/// assert!(state.absence_mode_enabled);
/// assert!(state.leakage_protection_paused_until.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDeviceState", into = "RawDeviceState")]
pub struct DeviceState {
    /// Whether the appliance is connected to the cloud.
    pub online: bool,
    /// Short identifier of the operating mode (e.g. `"WT"`).
    pub mode_id: String,
    /// Human readable operating mode.
    pub mode_name: String,
    /// Outcome of the last micro-leakage measurement.
    pub micro_leak: MicroLeakState,
    /// Whether absence mode is active.
    pub absence_mode_enabled: bool,
    /// End of the current leakage-protection pause, if one is active.
    pub leakage_protection_paused_until: Option<DateTime<Utc>>,
}

impl DeviceState {
    /// Returns `true` if leakage protection is paused at `at`.
    #[must_use]
    pub fn is_leakage_protection_paused(&self, at: DateTime<Utc>) -> bool {
        self.leakage_protection_paused_until
            .is_some_and(|until| until > at)
    }
}

/// Result of the micro-leakage measurement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MicroLeakState {
    /// The last measurement found no leak.
    Success,
    /// Any other state reported by the API, kept verbatim.
    Other(String),
}

impl MicroLeakState {
    /// Returns `true` if the last measurement succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the state as reported by the API.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for MicroLeakState {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("success") {
            Self::Success
        } else {
            Self::Other(s)
        }
    }
}

impl From<MicroLeakState> for String {
    fn from(state: MicroLeakState) -> Self {
        match state {
            MicroLeakState::Success => "success".to_string(),
            MicroLeakState::Other(s) => s,
        }
    }
}

impl fmt::Display for MicroLeakState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Wire shape of the `state` endpoint.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeviceState {
    online: bool,
    mode: RawMode,
    ml_state: MicroLeakState,
    water_protection: RawWaterProtection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawMode {
    #[serde(default)]
    id: String,
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWaterProtection {
    absence_mode_enabled: bool,
    #[serde(
        rename = "pauseLeakageProtectionUntilUTC",
        default,
        deserialize_with = "deserialize_optional_utc"
    )]
    pause_leakage_protection_until_utc: Option<DateTime<Utc>>,
}

impl From<RawDeviceState> for DeviceState {
    fn from(raw: RawDeviceState) -> Self {
        Self {
            online: raw.online,
            mode_id: raw.mode.id,
            mode_name: raw.mode.name,
            micro_leak: raw.ml_state,
            absence_mode_enabled: raw.water_protection.absence_mode_enabled,
            leakage_protection_paused_until: raw
                .water_protection
                .pause_leakage_protection_until_utc,
        }
    }
}

impl From<DeviceState> for RawDeviceState {
    fn from(state: DeviceState) -> Self {
        Self {
            online: state.online,
            mode: RawMode {
                id: state.mode_id,
                name: state.mode_name,
            },
            ml_state: state.micro_leak,
            water_protection: RawWaterProtection {
                absence_mode_enabled: state.absence_mode_enabled,
                pause_leakage_protection_until_utc: state.leakage_protection_paused_until,
            },
        }
    }
}
