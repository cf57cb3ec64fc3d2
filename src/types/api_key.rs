// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! API key credential.

use std::fmt;

use crate::error::ValueError;

/// Number of leading characters kept when the key is shown in logs.
const VISIBLE_PREFIX: usize = 4;

/// The `x-api-key` credential for the Watercryst cloud API.
///
/// The key is opaque and never empty. Its `Debug` output is redacted so the
/// key can be carried through logged structures safely.
///
/// # Examples
///
/// ```
/// use biocat_lib::types::ApiKey;
///
/// let key = ApiKey::new("abcd1234efgh").unwrap();
/// assert_eq!(key.as_str(), "abcd1234efgh");
/// assert_eq!(key.redacted(), "abcd****");
///
/// assert!(ApiKey::new("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates an API key, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyApiKey` if nothing is left after trimming.
    pub fn new(key: impl Into<String>) -> Result<Self, ValueError> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(ValueError::EmptyApiKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the raw key as sent in the request header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first characters of the key followed by `****`.
    #[must_use]
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(VISIBLE_PREFIX).collect();
        format!("{prefix}****")
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.redacted()).finish()
    }
}

impl TryFrom<String> for ApiKey {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApiKey> for String {
    fn from(key: ApiKey) -> Self {
        key.0
    }
}
