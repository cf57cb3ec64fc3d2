// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for coordinator activity.
//!
//! The [`EventBus`] fans out [`CoordinatorEvent`]s (refreshes, failures,
//! availability changes, command results) to any number of subscribers.

mod coordinator_event;
mod event_bus;

pub use coordinator_event::CoordinatorEvent;
pub use event_bus::EventBus;
