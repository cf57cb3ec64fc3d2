// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumption state types.
//!
//! [`ConsumptionAccumulators`] holds the daily, weekly and monthly totals
//! owned by a [`ConsumptionTracker`](crate::ConsumptionTracker), and
//! [`Snapshot`] is the immutable merged result of one refresh.
//!
//! # Examples
//!
//! ```
//! use biocat_lib::state::{ConsumptionAccumulators, PeriodKind};
//! use biocat_lib::types::parse_utc;
//!
//! let mut acc = ConsumptionAccumulators::new(parse_utc("2024-01-15T10:00:00Z").unwrap());
//! acc.add(3.5);
//! assert_eq!(acc.total(PeriodKind::Monthly), 3.5);
//! ```

mod accumulators;
mod snapshot;

pub use accumulators::{ConsumptionAccumulators, PeriodKind, PeriodTotal, Rollover};
pub use snapshot::Snapshot;
