// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response parsing for the Watercryst cloud API.
//!
//! Each read endpoint has a decoder here:
//!
//! | Endpoint | Decoder | Payload |
//! |----------|---------|---------|
//! | `statistics/cumulative/total` | [`parse_cumulative`] | bare number, `.` or `,` decimal |
//! | `state` | [`DeviceState`] | JSON object |
//! | `measurements/direct` | [`MeasurementSnapshot`] | JSON object |

mod consumption;
mod measurements;
mod state;

pub use consumption::parse_cumulative;
pub use measurements::MeasurementSnapshot;
pub use state::{DeviceState, MicroLeakState};
