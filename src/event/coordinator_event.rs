// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator event types.

use std::sync::Arc;

use crate::protocol::Endpoint;
use crate::state::Snapshot;

/// Events emitted by the [`Coordinator`](crate::Coordinator).
///
/// # Examples
///
/// ```
/// use biocat_lib::event::CoordinatorEvent;
/// use biocat_lib::protocol::Endpoint;
///
/// let failed = CoordinatorEvent::RefreshFailed {
///     endpoint: Endpoint::DeviceState,
///     error: "HTTP 503 - Service Unavailable".to_string(),
/// };
/// assert!(failed.is_failure());
/// ```
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    /// A refresh completed and a new snapshot was published.
    Refreshed {
        /// The published snapshot.
        snapshot: Arc<Snapshot>,
    },

    /// A refresh failed; the previous snapshot stays published.
    RefreshFailed {
        /// The endpoint whose read failed.
        endpoint: Endpoint,
        /// Description of the failure.
        error: String,
    },

    /// The coordinator became available or unavailable.
    AvailabilityChanged {
        /// Whether the last refresh succeeded.
        available: bool,
    },

    /// A device command was accepted by the API.
    CommandSent {
        /// Human readable command name.
        command: &'static str,
    },

    /// A device command failed.
    CommandFailed {
        /// Human readable command name.
        command: &'static str,
        /// Description of the failure.
        error: String,
    },
}

impl CoordinatorEvent {
    /// Returns `true` if this event reports a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::RefreshFailed { .. } | Self::CommandFailed { .. }
        )
    }

    /// Returns the snapshot carried by a `Refreshed` event.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            Self::Refreshed { snapshot } => Some(snapshot),
            _ => None,
        }
    }
}
