// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory [`Api`] used by unit tests.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::ProtocolError;
use crate::protocol::{Api, ApiResponse, Endpoint};
use crate::types::ApiKey;

/// A recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub method: &'static str,
    pub path: String,
    pub api_key: String,
}

/// Scripted API: each path answers with a fixed body or status code.
#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    responses: Mutex<HashMap<String, Result<String, u16>>>,
    calls: Mutex<Vec<Call>>,
    counter: Mutex<Option<u64>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake answering all three read endpoints with plausible payloads.
    pub fn healthy(cumulative: &str) -> Self {
        let api = Self::new();
        api.set_body(Endpoint::CumulativeConsumption.path(), cumulative);
        api.set_body(Endpoint::DeviceState.path(), STATE_JSON);
        api.set_body(Endpoint::Measurements.path(), MEASUREMENTS_JSON);
        api
    }

    pub fn set_body(&self, path: &str, body: &str) {
        self.responses
            .lock()
            .insert(path.to_string(), Ok(body.to_string()));
    }

    pub fn set_status(&self, path: &str, status: u16) {
        self.responses.lock().insert(path.to_string(), Err(status));
    }

    /// Answers the cumulative endpoint with `start`, `start + 1`, ... on
    /// successive calls.
    pub fn count_cumulative_from(&self, start: u64) {
        *self.counter.lock() = Some(start);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn answer(
        &self,
        method: &'static str,
        path: &str,
        api_key: &ApiKey,
    ) -> Result<ApiResponse, ProtocolError> {
        self.calls.lock().push(Call {
            method,
            path: path.to_string(),
            api_key: api_key.as_str().to_string(),
        });

        if path == Endpoint::CumulativeConsumption.path()
            && let Some(next) = self.counter.lock().as_mut()
        {
            let body = next.to_string();
            *next += 1;
            return Ok(ApiResponse::new(body));
        }

        match self.responses.lock().get(path) {
            Some(Ok(body)) => Ok(ApiResponse::new(body.clone())),
            Some(Err(status)) => Err(ProtocolError::HttpStatus {
                status: *status,
                reason: "Scripted".to_string(),
            }),
            None => Err(ProtocolError::HttpStatus {
                status: 404,
                reason: "Not Found".to_string(),
            }),
        }
    }
}

impl Api for FakeApi {
    async fn get(&self, path: &str, api_key: &ApiKey) -> Result<ApiResponse, ProtocolError> {
        self.answer("GET", path, api_key)
    }

    async fn post(&self, path: &str, api_key: &ApiKey) -> Result<ApiResponse, ProtocolError> {
        self.answer("POST", path, api_key)
    }
}

pub(crate) const STATE_JSON: &str = r#"{
    "online": true,
    "mode": {"id": "WT", "name": "Water tap"},
    "mlState": "success",
    "waterProtection": {
        "absenceModeEnabled": false,
        "pauseLeakageProtectionUntilUTC": null
    }
}"#;

pub(crate) const MEASUREMENTS_JSON: &str = r#"{
    "waterTemp": 14.2,
    "pressure": 4.1,
    "flowRate": 0.0,
    "lastWaterTapVolume": 2.5,
    "lastWaterTapDuration": 18
}"#;
