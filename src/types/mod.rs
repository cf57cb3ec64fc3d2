// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for the Biocat integration.
//!
//! Each type ensures values are within their valid ranges at construction
//! time, so invalid configuration is rejected before anything is polled.
//!
//! # Types
//!
//! - [`ApiKey`] - Non-empty cloud API credential with redacted `Debug`
//! - [`PollInterval`] - Refresh interval (2-3600 seconds, default 60)
//!
//! # Functions
//!
//! - [`parse_utc`] - Parse API timestamps as UTC
//! - [`start_of_day`], [`start_of_week`], [`start_of_month`] - Period floors

mod api_key;
mod datetime;
mod interval;

pub use api_key::ApiKey;
pub(crate) use datetime::deserialize_optional_utc;
pub use datetime::{parse_utc, start_of_day, start_of_month, start_of_week};
pub use interval::PollInterval;
