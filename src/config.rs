// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration configuration.
//!
//! An [`IntegrationConfig`] holds everything needed to run a
//! [`Coordinator`](crate::Coordinator) against one Biocat appliance. It is
//! stored as a flat JSON object:
//!
//! ```json
//! {
//!   "entry_id": "6f1c1c62-8c4e-4f55-9a59-3c1f0f4ce0b5",
//!   "api_key": "abcd1234",
//!   "update_interval": 60,
//!   "base_url": "https://appapi.watercryst.com/v1",
//!   "timeout_secs": 30
//! }
//! ```
//!
//! Only `api_key` is required; the other keys fall back to defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;
use crate::protocol::DEFAULT_BASE_URL;
use crate::types::{ApiKey, PollInterval};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration of one integration entry.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use biocat_lib::config::IntegrationConfig;
/// use biocat_lib::types::{ApiKey, PollInterval};
///
/// let config = IntegrationConfig::new(ApiKey::new("abcd1234").unwrap())
///     .with_poll_interval(PollInterval::from_secs(30).unwrap())
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.poll_interval.seconds(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// Stable identifier of this entry; prefixes entity unique ids.
    #[serde(default = "Uuid::new_v4")]
    pub entry_id: Uuid,

    /// Credential sent as `x-api-key`.
    pub api_key: ApiKey,

    /// Time between two refreshes.
    #[serde(default, rename = "update_interval", alias = "poll_interval")]
    pub poll_interval: PollInterval,

    /// Base URL of the cloud API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(
        default = "default_timeout",
        rename = "timeout_secs",
        with = "duration_secs"
    )]
    pub timeout: Duration,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        match u64::deserialize(d)? {
            0 => Err(serde::de::Error::custom(
                "timeout_secs must be at least 1 second",
            )),
            secs => Ok(Duration::from_secs(secs)),
        }
    }
}

impl IntegrationConfig {
    /// Creates a configuration with a fresh entry id and default settings.
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            api_key,
            poll_interval: PollInterval::default(),
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }

    /// Sets the entry id.
    #[must_use]
    pub fn with_entry_id(mut self, entry_id: Uuid) -> Self {
        self.entry_id = entry_id;
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: PollInterval) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-request timeout, raised to at least one second.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(MIN_TIMEOUT);
        self
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the JSON is malformed, the API key is
    /// missing or empty, or the poll interval is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Json` if its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&contents)?;
        tracing::debug!(
            path = %path.display(),
            entry_id = %config.entry_id,
            api_key = %config.api_key.redacted(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Writes the configuration to a file, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), entry_id = %self.entry_id, "Saved configuration");
        Ok(())
    }

    /// Returns the HTTP transport settings of this entry.
    #[cfg(feature = "http")]
    #[must_use]
    pub fn http_config(&self) -> crate::protocol::HttpConfig {
        crate::protocol::HttpConfig::new()
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout)
    }
}
