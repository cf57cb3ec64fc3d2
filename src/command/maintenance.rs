// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot maintenance commands.

use crate::command::Command;

/// One-shot actions, each backing a button entity.
///
/// # Examples
///
/// ```
/// use biocat_lib::command::{Command, MaintenanceCommand};
///
/// assert_eq!(MaintenanceCommand::SelfTest.path(), "selftest");
/// assert_eq!(MaintenanceCommand::AcknowledgeEvent.name(), "Acknowledge Event");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaintenanceCommand {
    /// Run the appliance self test.
    SelfTest,
    /// Start a micro-leakage measurement.
    StartMicroLeakMeasurement,
    /// Acknowledge the currently reported event.
    AcknowledgeEvent,
}

impl MaintenanceCommand {
    /// All maintenance commands.
    pub const ALL: [Self; 3] = [
        Self::SelfTest,
        Self::StartMicroLeakMeasurement,
        Self::AcknowledgeEvent,
    ];

    /// Stable key used in entity unique ids.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SelfTest => "self_test",
            Self::StartMicroLeakMeasurement => "ml_measurement_start",
            Self::AcknowledgeEvent => "ack_event",
        }
    }
}

impl Command for MaintenanceCommand {
    fn path(&self) -> &'static str {
        match self {
            Self::SelfTest => "selftest",
            Self::StartMicroLeakMeasurement => "mlmeasurement/start",
            Self::AcknowledgeEvent => "ackevent",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::SelfTest => "Start Self Test",
            Self::StartMicroLeakMeasurement => "Start Micro-Leakage Measurement",
            Self::AcknowledgeEvent => "Acknowledge Event",
        }
    }
}
