// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity projections over a [`Snapshot`].
//!
//! Each entity kind is a tag plus an accessor: it names a value in the
//! snapshot and describes how to present it (display name, unit, unique
//! id). The set is closed; hosts enumerate `ALL` to register entities.
//!
//! | Platform | Type |
//! |----------|------|
//! | Sensor | [`SensorKind`] |
//! | Binary sensor | [`BinarySensorKind`] |
//! | Switch | [`SwitchKind`] |
//! | Button | [`MaintenanceCommand`] |
//!
//! # Examples
//!
//! ```
//! use biocat_lib::entity::{SensorKind, unique_id};
//! use uuid::Uuid;
//!
//! let entry = Uuid::nil();
//! let kind = SensorKind::WaterPressure;
//! assert_eq!(kind.display_name(), "Biocat Water Pressure");
//! assert_eq!(kind.unit(), Some("bar"));
//! assert_eq!(
//!     unique_id(entry, kind.key()),
//!     "00000000-0000-0000-0000-000000000000_water_pressure"
//! );
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::command::{
    AbsenceModeCommand, Command, LeakageProtectionCommand, MaintenanceCommand, WaterSupplyCommand,
};
use crate::state::Snapshot;

/// Prefix of every entity display name.
pub const NAME_PREFIX: &str = "Biocat";

/// Builds the unique id of an entity: `{entry_id}_{key}`.
#[must_use]
pub fn unique_id(entry_id: Uuid, key: &str) -> String {
    format!("{entry_id}_{key}")
}

fn display_name(name: &str) -> String {
    format!("{NAME_PREFIX} {name}")
}

/// Value of a sensor entity.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    /// A numeric reading in the sensor's unit.
    Number(f64),
    /// A textual state.
    Text(String),
    /// A point in time.
    Timestamp(DateTime<Utc>),
    /// No value is currently reported.
    Unknown,
}

impl SensorValue {
    /// Returns the numeric value, if any.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Sensor entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Water temperature in °C.
    WaterTemperature,
    /// Line pressure in bar.
    WaterPressure,
    /// Current flow in L/min.
    FlowRate,
    /// Volume of the last tap event in L.
    LastTapVolume,
    /// Duration of the last tap event in s.
    LastTapDuration,
    /// Lifetime counter reported by the appliance in L.
    CumulativeConsumption,
    /// Consumption since the start of the day in L.
    DailyConsumption,
    /// Consumption since the start of the week in L.
    WeeklyConsumption,
    /// Consumption since the start of the monthly period in L.
    MonthlyConsumption,
    /// Operating mode name.
    OperatingMode,
    /// Operating mode identifier.
    WaterSupplyState,
    /// Outcome of the last micro-leakage measurement.
    MicroLeakState,
    /// End of the current leakage-protection pause.
    LeakageProtectionPausedUntil,
}

impl SensorKind {
    /// All sensor entities.
    pub const ALL: [Self; 13] = [
        Self::WaterTemperature,
        Self::WaterPressure,
        Self::FlowRate,
        Self::LastTapVolume,
        Self::LastTapDuration,
        Self::CumulativeConsumption,
        Self::DailyConsumption,
        Self::WeeklyConsumption,
        Self::MonthlyConsumption,
        Self::OperatingMode,
        Self::WaterSupplyState,
        Self::MicroLeakState,
        Self::LeakageProtectionPausedUntil,
    ];

    /// Returns the stable key used in unique ids.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::WaterTemperature => "water_temperature",
            Self::WaterPressure => "water_pressure",
            Self::FlowRate => "flow_rate",
            Self::LastTapVolume => "last_water_tap_volume",
            Self::LastTapDuration => "last_water_tap_duration",
            Self::CumulativeConsumption => "cumulative_water_consumption",
            Self::DailyConsumption => "total_water_consumption_today",
            Self::WeeklyConsumption => "total_water_consumption_week",
            Self::MonthlyConsumption => "total_water_consumption_month",
            Self::OperatingMode => "operating_mode",
            Self::WaterSupplyState => "water_supply_state",
            Self::MicroLeakState => "micro_leakage_state",
            Self::LeakageProtectionPausedUntil => "leakage_protection_paused_until",
        }
    }

    /// Returns the name without prefix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WaterTemperature => "Water Temperature",
            Self::WaterPressure => "Water Pressure",
            Self::FlowRate => "Flow Rate",
            Self::LastTapVolume => "Last Water Tap Volume",
            Self::LastTapDuration => "Last Water Tap Duration",
            Self::CumulativeConsumption => "Cumulative Water Consumption",
            Self::DailyConsumption => "Total Water Consumption Today",
            Self::WeeklyConsumption => "Total Water Consumption This Week",
            Self::MonthlyConsumption => "Total Water Consumption This Month",
            Self::OperatingMode => "Operating Mode",
            Self::WaterSupplyState => "Water Supply State",
            Self::MicroLeakState => "Micro-Leakage State",
            Self::LeakageProtectionPausedUntil => "Leakage Protection Paused Until",
        }
    }

    /// Returns the name shown to users.
    #[must_use]
    pub fn display_name(self) -> String {
        display_name(self.name())
    }

    /// Returns the unit of measurement, if the sensor has one.
    #[must_use]
    pub const fn unit(self) -> Option<&'static str> {
        match self {
            Self::WaterTemperature => Some("°C"),
            Self::WaterPressure => Some("bar"),
            Self::FlowRate => Some("L/min"),
            Self::LastTapVolume
            | Self::CumulativeConsumption
            | Self::DailyConsumption
            | Self::WeeklyConsumption
            | Self::MonthlyConsumption => Some("L"),
            Self::LastTapDuration => Some("s"),
            Self::OperatingMode
            | Self::WaterSupplyState
            | Self::MicroLeakState
            | Self::LeakageProtectionPausedUntil => None,
        }
    }

    /// Reads this sensor's value from a snapshot.
    #[must_use]
    pub fn value(self, snapshot: &Snapshot) -> SensorValue {
        let m = &snapshot.measurements;
        let state = &snapshot.state;
        match self {
            Self::WaterTemperature => SensorValue::Number(m.water_temperature),
            Self::WaterPressure => SensorValue::Number(m.pressure),
            Self::FlowRate => SensorValue::Number(m.flow_rate),
            Self::LastTapVolume => SensorValue::Number(m.last_tap_volume),
            Self::LastTapDuration => SensorValue::Number(m.last_tap_duration),
            Self::CumulativeConsumption => SensorValue::Number(snapshot.cumulative_consumption),
            Self::DailyConsumption => SensorValue::Number(snapshot.daily_consumption()),
            Self::WeeklyConsumption => SensorValue::Number(snapshot.weekly_consumption()),
            Self::MonthlyConsumption => SensorValue::Number(snapshot.monthly_consumption()),
            Self::OperatingMode => SensorValue::Text(state.mode_name.clone()),
            Self::WaterSupplyState => SensorValue::Text(state.mode_id.clone()),
            Self::MicroLeakState => SensorValue::Text(state.micro_leak.to_string()),
            Self::LeakageProtectionPausedUntil => state
                .leakage_protection_paused_until
                .map_or(SensorValue::Unknown, SensorValue::Timestamp),
        }
    }
}

/// Binary sensor entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarySensorKind {
    /// The appliance is connected to the cloud.
    Online,
    /// Absence mode is active.
    AbsenceMode,
    /// The last micro-leakage measurement found no leak.
    MicroLeakTestPassed,
    /// Leakage protection is paused.
    LeakageProtectionPaused,
}

impl BinarySensorKind {
    /// All binary sensor entities.
    pub const ALL: [Self; 4] = [
        Self::Online,
        Self::AbsenceMode,
        Self::MicroLeakTestPassed,
        Self::LeakageProtectionPaused,
    ];

    /// Returns the stable key used in unique ids.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::AbsenceMode => "absence_mode",
            Self::MicroLeakTestPassed => "micro_leakage_test_passed",
            Self::LeakageProtectionPaused => "leakage_protection_paused",
        }
    }

    /// Returns the name without prefix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::AbsenceMode => "Absence Mode",
            Self::MicroLeakTestPassed => "Micro-Leakage Test Passed",
            Self::LeakageProtectionPaused => "Leakage Protection Paused",
        }
    }

    /// Returns the name shown to users.
    #[must_use]
    pub fn display_name(self) -> String {
        display_name(self.name())
    }

    /// Reads this sensor's state from a snapshot.
    #[must_use]
    pub fn is_on(self, snapshot: &Snapshot) -> bool {
        match self {
            Self::Online => snapshot.state.online,
            Self::AbsenceMode => snapshot.state.absence_mode_enabled,
            Self::MicroLeakTestPassed => snapshot.state.micro_leak.is_success(),
            Self::LeakageProtectionPaused => snapshot.is_leakage_protection_paused(),
        }
    }
}

/// Switch entities, each backed by an on/off command pair.
///
/// # Examples
///
/// ```
/// use biocat_lib::entity::SwitchKind;
///
/// let switch = SwitchKind::LeakageProtectionPause;
/// assert_eq!(switch.command(true).path(), "leakageprotection/pause");
/// assert_eq!(switch.command(false).path(), "leakageprotection/unpause");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchKind {
    /// On opens the main valve, off closes it.
    WaterSupply,
    /// On pauses leakage protection, off resumes it.
    LeakageProtectionPause,
    /// On enables absence mode, off disables it.
    AbsenceMode,
}

impl SwitchKind {
    /// All switch entities.
    pub const ALL: [Self; 3] = [
        Self::WaterSupply,
        Self::LeakageProtectionPause,
        Self::AbsenceMode,
    ];

    /// Returns the stable key used in unique ids.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::WaterSupply => "water_supply",
            Self::LeakageProtectionPause => "leakage_protection_pause",
            Self::AbsenceMode => "absence_mode",
        }
    }

    /// Returns the name without prefix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WaterSupply => "Water Supply",
            Self::LeakageProtectionPause => "Pause Leakage Protection",
            Self::AbsenceMode => "Absence Mode",
        }
    }

    /// Returns the name shown to users.
    #[must_use]
    pub fn display_name(self) -> String {
        display_name(self.name())
    }

    /// Returns the command that moves the switch to `on`.
    #[must_use]
    pub fn command(self, on: bool) -> &'static (dyn Command + Sync) {
        match (self, on) {
            (Self::WaterSupply, true) => &WaterSupplyCommand::Open,
            (Self::WaterSupply, false) => &WaterSupplyCommand::Close,
            (Self::LeakageProtectionPause, true) => &LeakageProtectionCommand::Pause,
            (Self::LeakageProtectionPause, false) => &LeakageProtectionCommand::Unpause,
            (Self::AbsenceMode, true) => &AbsenceModeCommand::Enable,
            (Self::AbsenceMode, false) => &AbsenceModeCommand::Disable,
        }
    }

    /// Reads the switch position from a snapshot.
    ///
    /// The valve position is not reported by the API, so the water supply
    /// switch returns `None`.
    #[must_use]
    pub fn is_on(self, snapshot: &Snapshot) -> Option<bool> {
        match self {
            Self::WaterSupply => None,
            Self::LeakageProtectionPause => Some(snapshot.is_leakage_protection_paused()),
            Self::AbsenceMode => Some(snapshot.state.absence_mode_enabled),
        }
    }
}

impl MaintenanceCommand {
    /// Returns the name shown to users for the button entity.
    #[must_use]
    pub fn display_name(self) -> String {
        display_name(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::protocol::fake::{MEASUREMENTS_JSON, STATE_JSON};
    use crate::state::ConsumptionAccumulators;
    use crate::types::parse_utc;

    fn snapshot() -> Snapshot {
        let now = parse_utc("2024-03-14T06:00:00Z").unwrap();
        let mut consumption = ConsumptionAccumulators::new(now);
        consumption.add(12.5);
        Snapshot {
            taken_at: now,
            cumulative_consumption: 512.5,
            consumption,
            state: serde_json::from_str(STATE_JSON).unwrap(),
            measurements: serde_json::from_str(MEASUREMENTS_JSON).unwrap(),
        }
    }

    #[test]
    fn sensor_values_read_the_right_fields() {
        let s = snapshot();
        assert_eq!(
            SensorKind::WaterTemperature.value(&s),
            SensorValue::Number(14.2)
        );
        assert_eq!(SensorKind::WaterPressure.value(&s), SensorValue::Number(4.1));
        assert_eq!(
            SensorKind::LastTapDuration.value(&s),
            SensorValue::Number(18.0)
        );
        assert_eq!(
            SensorKind::CumulativeConsumption.value(&s),
            SensorValue::Number(512.5)
        );
        assert_eq!(
            SensorKind::DailyConsumption.value(&s),
            SensorValue::Number(12.5)
        );
        assert_eq!(
            SensorKind::OperatingMode.value(&s),
            SensorValue::Text("Water tap".to_string())
        );
        assert_eq!(
            SensorKind::WaterSupplyState.value(&s),
            SensorValue::Text("WT".to_string())
        );
        assert_eq!(
            SensorKind::MicroLeakState.value(&s),
            SensorValue::Text("success".to_string())
        );
        assert_eq!(
            SensorKind::LeakageProtectionPausedUntil.value(&s),
            SensorValue::Unknown
        );
    }

    #[test]
    fn pause_end_is_a_timestamp() {
        let mut s = snapshot();
        let until = parse_utc("2024-03-14T08:00:00Z").unwrap();
        s.state.leakage_protection_paused_until = Some(until);

        assert_eq!(
            SensorKind::LeakageProtectionPausedUntil.value(&s),
            SensorValue::Timestamp(until)
        );
        assert!(BinarySensorKind::LeakageProtectionPaused.is_on(&s));
        assert_eq!(SwitchKind::LeakageProtectionPause.is_on(&s), Some(true));
    }

    #[test]
    fn binary_sensors() {
        let s = snapshot();
        assert!(BinarySensorKind::Online.is_on(&s));
        assert!(!BinarySensorKind::AbsenceMode.is_on(&s));
        assert!(BinarySensorKind::MicroLeakTestPassed.is_on(&s));
        assert!(!BinarySensorKind::LeakageProtectionPaused.is_on(&s));
    }

    #[test]
    fn switch_state_and_commands() {
        let s = snapshot();
        assert_eq!(SwitchKind::WaterSupply.is_on(&s), None);
        assert_eq!(SwitchKind::AbsenceMode.is_on(&s), Some(false));
        assert_eq!(
            SwitchKind::WaterSupply.command(false).name(),
            "Close Water Supply"
        );
        assert_eq!(SwitchKind::AbsenceMode.command(true).path(), "absence/enable");
    }

    #[test]
    fn units() {
        assert_eq!(SensorKind::WaterTemperature.unit(), Some("°C"));
        assert_eq!(SensorKind::FlowRate.unit(), Some("L/min"));
        assert_eq!(SensorKind::MonthlyConsumption.unit(), Some("L"));
        assert_eq!(SensorKind::OperatingMode.unit(), None);
    }

    #[test]
    fn display_names_are_prefixed() {
        assert_eq!(
            SensorKind::DailyConsumption.display_name(),
            "Biocat Total Water Consumption Today"
        );
        assert_eq!(BinarySensorKind::Online.display_name(), "Biocat Online");
        assert_eq!(
            MaintenanceCommand::AcknowledgeEvent.display_name(),
            "Biocat Acknowledge Event"
        );
    }

    #[test]
    fn unique_ids_are_distinct_per_platform() {
        let entry = Uuid::new_v4();
        let sensors: HashSet<_> = SensorKind::ALL
            .iter()
            .map(|k| unique_id(entry, k.key()))
            .collect();
        assert_eq!(sensors.len(), SensorKind::ALL.len());

        let buttons: HashSet<_> = MaintenanceCommand::ALL
            .iter()
            .map(|c| unique_id(entry, c.key()))
            .collect();
        assert_eq!(buttons.len(), MaintenanceCommand::ALL.len());

        assert!(unique_id(entry, "online").starts_with(&entry.to_string()));
        assert!(unique_id(entry, "online").ends_with("_online"));
    }
}
