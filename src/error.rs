// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `Biocat` library.
//!
//! This module provides the error hierarchy used across the library: value
//! validation, protocol communication, payload parsing, configuration
//! persistence, and the [`FetchError`] surfaced by a failed refresh.

use std::path::PathBuf;

use thiserror::Error;

use crate::protocol::Endpoint;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A refresh failed because one of its reads failed.
    #[error("refresh failed: {0}")]
    Fetch(#[from] FetchError),

    /// Loading or saving the configuration failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
        /// The actual value that was provided.
        actual: u64,
    },

    /// The API key is empty or whitespace only.
    #[error("API key must not be empty")]
    EmptyApiKey,
}

/// Errors related to HTTP communication with the vendor API.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed at the transport level.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the API failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The API answered with a non-success status.
    #[error("HTTP {status} - {reason}")]
    HttpStatus {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase, or `"Unknown"`.
        reason: String,
    },

    /// The API key was rejected (HTTP 401 or 403).
    #[error("authentication failed (HTTP {status})")]
    AuthenticationFailed {
        /// The status the API answered with.
        status: u16,
    },

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to decoding API payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A numeric payload could not be read.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
}

/// Why a single read failed.
#[derive(Debug, Error)]
pub enum FetchCause {
    /// Network, timeout or non-2xx status.
    #[error(transparent)]
    Transport(#[from] ProtocolError),

    /// The payload arrived but could not be decoded.
    #[error(transparent)]
    Decode(#[from] ParseError),
}

/// A refresh failed on one of its reads.
///
/// The failing endpoint is always identified. Tracker state is left exactly
/// as it was before the refresh started.
#[derive(Debug, Error)]
#[error("fetching {endpoint} failed: {cause}")]
pub struct FetchError {
    /// The endpoint whose read failed.
    pub endpoint: Endpoint,
    /// The underlying failure.
    #[source]
    pub cause: FetchCause,
}

impl FetchError {
    /// Creates a fetch error for the given endpoint.
    #[must_use]
    pub fn new(endpoint: Endpoint, cause: impl Into<FetchCause>) -> Self {
        Self {
            endpoint,
            cause: cause.into(),
        }
    }

    /// Returns `true` if the request never produced a response because of a
    /// network failure or timeout.
    ///
    /// An invalid base URL is a configuration problem and not counted here.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match &self.cause {
            FetchCause::Transport(err) => !matches!(
                err,
                ProtocolError::HttpStatus { .. }
                    | ProtocolError::AuthenticationFailed { .. }
                    | ProtocolError::InvalidAddress(_)
            ),
            FetchCause::Decode(_) => false,
        }
    }

    /// Returns the HTTP status if the API answered with a non-success code.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match &self.cause {
            FetchCause::Transport(ProtocolError::HttpStatus { status, .. }) => Some(*status),
            FetchCause::Transport(ProtocolError::AuthenticationFailed { status }) => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Returns `true` if the payload could not be decoded.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self.cause, FetchCause::Decode(_))
    }
}

/// Errors related to loading and saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file contents are not a valid configuration.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
