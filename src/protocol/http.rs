// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the Watercryst cloud API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};

use crate::error::ProtocolError;
use crate::protocol::{Api, ApiResponse, DEFAULT_BASE_URL};
use crate::types::ApiKey;

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for the cloud API HTTP client.
///
/// # Examples
///
/// ```
/// use biocat_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// // Vendor defaults
/// let config = HttpConfig::new();
/// assert_eq!(config.base_url(), "https://appapi.watercryst.com/v1");
///
/// // Custom endpoint and timeout
/// let config = HttpConfig::new()
///     .with_base_url("http://127.0.0.1:8080/v1/")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "http://127.0.0.1:8080/v1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_url: String,
    timeout: Duration,
}

impl HttpConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a configuration pointing at the vendor API.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom base URL. A trailing slash is dropped.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL has no http(s) scheme or the HTTP
    /// client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProtocolError::InvalidAddress(self.base_url));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url: self.base_url,
            timeout: self.timeout,
            client,
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client for the Watercryst cloud API.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Examples
///
/// ```no_run
/// use biocat_lib::protocol::{Api, HttpClient};
/// use biocat_lib::types::ApiKey;
///
/// # async fn example() -> biocat_lib::Result<()> {
/// let client = HttpClient::new()?;
/// let key = ApiKey::new("my-api-key")?;
/// let response = client.get("state", &key).await?;
/// println!("{}", response.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl HttpClient {
    /// Creates a client for the vendor API with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, ProtocolError> {
        HttpConfig::new().into_client()
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL for a path relative to the base URL.
    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends a prepared request and checks the status.
    async fn execute(
        &self,
        request: RequestBuilder,
        api_key: &ApiKey,
    ) -> Result<ApiResponse, ProtocolError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .header("x-api-key", api_key.as_str())
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProtocolError::AuthenticationFailed {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            return Err(ProtocolError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_transport(e))?;

        tracing::debug!(body = %body, "Received HTTP response");

        Ok(ApiResponse::new(body))
    }

    fn map_transport(&self, err: reqwest::Error) -> ProtocolError {
        if err.is_timeout() {
            // Saturates at u64::MAX ms, far beyond any configured timeout
            #[allow(clippy::cast_possible_truncation)]
            let millis = self.timeout.as_millis().min(u128::from(u64::MAX)) as u64;
            ProtocolError::Timeout(millis)
        } else if err.is_connect() {
            ProtocolError::ConnectionFailed(err.to_string())
        } else {
            ProtocolError::Http(err)
        }
    }
}

impl Api for HttpClient {
    async fn get(&self, path: &str, api_key: &ApiKey) -> Result<ApiResponse, ProtocolError> {
        let url = self.build_url(path);

        tracing::debug!(url = %url, key = %api_key.redacted(), "Sending HTTP GET");

        self.execute(self.client.get(&url), api_key).await
    }

    async fn post(&self, path: &str, api_key: &ApiKey) -> Result<ApiResponse, ProtocolError> {
        let url = self.build_url(path);

        tracing::debug!(url = %url, key = %api_key.redacted(), "Sending HTTP POST");

        self.execute(self.client.post(&url), api_key).await
    }
}
