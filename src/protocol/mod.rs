// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport for the Watercryst cloud API.
//!
//! Every request carries two headers: `accept: application/json` and
//! `x-api-key: <key>`. Reads use `GET`, device commands use `POST`.
//!
//! # Implementations
//!
//! - [`HttpClient`]: `reqwest` based client with a bounded request timeout
//!
//! Anything implementing [`Api`] can drive a
//! [`ConsumptionTracker`](crate::ConsumptionTracker), which keeps the
//! refresh logic independent of the network stack.

#[cfg(test)]
pub(crate) mod fake;
#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{HttpClient, HttpConfig};

use std::fmt;
use std::future::Future;

use crate::error::{ParseError, ProtocolError};
use crate::types::ApiKey;

/// Default base URL of the Watercryst cloud API.
pub const DEFAULT_BASE_URL: &str = "https://appapi.watercryst.com/v1";

/// The read endpoints polled on every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Endpoint {
    /// Cumulative water consumption, answered as bare numeric text.
    CumulativeConsumption,
    /// Device state (online flag, mode, protection flags) as JSON.
    DeviceState,
    /// Instantaneous measurements (temperature, pressure, flow) as JSON.
    Measurements,
}

impl Endpoint {
    /// All read endpoints, in refresh order.
    pub const ALL: [Self; 3] = [
        Self::CumulativeConsumption,
        Self::DeviceState,
        Self::Measurements,
    ];

    /// Returns the path relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::CumulativeConsumption => "statistics/cumulative/total",
            Self::DeviceState => "state",
            Self::Measurements => "measurements/direct",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CumulativeConsumption => "cumulative consumption",
            Self::DeviceState => "device state",
            Self::Measurements => "measurements",
        };
        f.write_str(name)
    }
}

/// Body of a successful API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    body: String,
}

impl ApiResponse {
    /// Creates a response with the given body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the body as JSON into the target type.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON cannot be parsed into the target type.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }
}

/// A transport able to reach the Watercryst cloud API.
///
/// Implementations attach the `accept` and `x-api-key` headers and map
/// non-success statuses to [`ProtocolError`]. The returned futures are
/// `Send` so a refresh can run inside a spawned task.
pub trait Api {
    /// Issues a `GET` to `path` (relative to the base URL).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on transport failure, timeout or non-2xx status.
    fn get(
        &self,
        path: &str,
        api_key: &ApiKey,
    ) -> impl Future<Output = Result<ApiResponse, ProtocolError>> + Send;

    /// Issues a `POST` without body to `path` (relative to the base URL).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on transport failure, timeout or non-2xx status.
    fn post(
        &self,
        path: &str,
        api_key: &ApiKey,
    ) -> impl Future<Output = Result<ApiResponse, ProtocolError>> + Send;
}
