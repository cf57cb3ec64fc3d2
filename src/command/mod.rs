// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device command definitions.
//!
//! Commands are fire-and-forget `POST` requests without body. They are a
//! side channel: sending one never touches the consumption tracker, the
//! effect shows up in the next refreshed snapshot.
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Paths |
//! |-------------|---------|-------|
//! | [`WaterSupplyCommand`] | Open or close the main valve | `watersupply/open`, `watersupply/close` |
//! | [`LeakageProtectionCommand`] | Pause or resume leak protection | `leakageprotection/pause`, `leakageprotection/unpause` |
//! | [`AbsenceModeCommand`] | Toggle absence mode | `absence/enable`, `absence/disable` |
//! | [`MaintenanceCommand`] | Self test, micro-leak test, event acknowledge | `selftest`, `mlmeasurement/start`, `ackevent` |
//!
//! # Examples
//!
//! ```
//! use biocat_lib::command::{Command, WaterSupplyCommand};
//!
//! let cmd = WaterSupplyCommand::Close;
//! assert_eq!(cmd.path(), "watersupply/close");
//! assert_eq!(cmd.name(), "Close Water Supply");
//! ```

mod maintenance;
mod protection;

pub use maintenance::MaintenanceCommand;
pub use protection::{AbsenceModeCommand, LeakageProtectionCommand, WaterSupplyCommand};

/// A command that can be sent to the appliance through the cloud API.
pub trait Command {
    /// Returns the path relative to the API base URL.
    fn path(&self) -> &'static str;

    /// Returns a human readable name, used for logging and entity names.
    fn name(&self) -> &'static str;
}
