// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Water protection commands.
//!
//! Each of these comes as an on/off pair and backs one switch entity.

use crate::command::Command;

/// Command to open or close the main water supply valve.
///
/// # Examples
///
/// ```
/// use biocat_lib::command::{Command, WaterSupplyCommand};
///
/// assert_eq!(WaterSupplyCommand::Open.path(), "watersupply/open");
/// assert_eq!(WaterSupplyCommand::from_on(false), WaterSupplyCommand::Close);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterSupplyCommand {
    /// Open the valve.
    Open,
    /// Close the valve.
    Close,
}

impl WaterSupplyCommand {
    /// Both variants.
    pub const ALL: [Self; 2] = [Self::Open, Self::Close];

    /// Maps a switch position to a command: `true` opens the supply.
    #[must_use]
    pub const fn from_on(on: bool) -> Self {
        if on { Self::Open } else { Self::Close }
    }
}

impl Command for WaterSupplyCommand {
    fn path(&self) -> &'static str {
        match self {
            Self::Open => "watersupply/open",
            Self::Close => "watersupply/close",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Open => "Open Water Supply",
            Self::Close => "Close Water Supply",
        }
    }
}

/// Command to pause or resume leakage protection.
///
/// The API decides how long a pause lasts; the end time is reported in the
/// device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeakageProtectionCommand {
    /// Pause leakage protection.
    Pause,
    /// Resume leakage protection.
    Unpause,
}

impl LeakageProtectionCommand {
    /// Both variants.
    pub const ALL: [Self; 2] = [Self::Pause, Self::Unpause];

    /// Maps a switch position to a command: `true` pauses protection.
    #[must_use]
    pub const fn from_on(on: bool) -> Self {
        if on { Self::Pause } else { Self::Unpause }
    }
}

impl Command for LeakageProtectionCommand {
    fn path(&self) -> &'static str {
        match self {
            Self::Pause => "leakageprotection/pause",
            Self::Unpause => "leakageprotection/unpause",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Pause => "Pause Leakage Protection",
            Self::Unpause => "Unpause Leakage Protection",
        }
    }
}

/// Command to enable or disable absence mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbsenceModeCommand {
    /// Enable absence mode.
    Enable,
    /// Disable absence mode.
    Disable,
}

impl AbsenceModeCommand {
    /// Both variants.
    pub const ALL: [Self; 2] = [Self::Enable, Self::Disable];

    /// Maps a switch position to a command: `true` enables absence mode.
    #[must_use]
    pub const fn from_on(on: bool) -> Self {
        if on { Self::Enable } else { Self::Disable }
    }
}

impl Command for AbsenceModeCommand {
    fn path(&self) -> &'static str {
        match self {
            Self::Enable => "absence/enable",
            Self::Disable => "absence/disable",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Enable => "Enable Absence Mode",
            Self::Disable => "Disable Absence Mode",
        }
    }
}
