//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Error types for redial.
//!
//! There are two layers of failure in this crate:
//!
//! 1. **Configuration**: a policy was built from parameters outside their
//!    valid domain ([`ConfigError`]). These are raised synchronously while the
//!    policy is constructed and are never retried or corrected.
//! 2. **Driver**: the optional reference reconnection loop was aborted before
//!    a connection was re-established ([`ReconnectError`]).
//!
//! Producing schedules and delays never fails once a policy exists.
//!
//! # Examples
//!
//! ```rust
//! use redial::ConfigError;
//!
//! let error = ConfigError::negative_delay("base_delay", -5);
//! assert!(error.is_negative_delay());
//! assert_eq!(error.option(), Some("base_delay"));
//! assert!(error.to_string().contains("-5"));
//! ```

use std::time::Duration;
use thiserror::Error;

/// Errors raised while building a reconnection policy from its parameters.
///
/// A `ConfigError` is fatal to policy construction: the client must not start
/// with an invalid policy.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A delay option was configured with a negative value.
    #[error("invalid negative delay for {option} (got {value_ms}ms)")]
    NegativeDelay {
        /// Path of the offending option
        option: String,
        /// The rejected value, in milliseconds
        value_ms: i64,
    },

    /// The maximum delay is smaller than the base delay.
    #[error("invalid delay range: max_delay ({max:?}) is below base_delay ({base:?})")]
    InvalidRange {
        /// Configured base delay
        base: Duration,
        /// Configured maximum delay
        max: Duration,
    },

    /// A duration option could not be parsed.
    #[error("invalid duration for {option}: {value:?}")]
    InvalidDuration {
        /// Path of the offending option
        option: String,
        /// The raw value that failed to parse
        value: String,
    },

    /// An option holds a value of the wrong type.
    #[error("wrong type for {option}: expected {expected}, found {found}")]
    WrongType {
        /// Path of the offending option
        option: String,
        /// Type the option should have
        expected: &'static str,
        /// Type that was actually configured
        found: &'static str,
    },

    /// No policy is registered under the requested name.
    #[error("unknown reconnection policy: {name}")]
    UnknownPolicy {
        /// The requested policy name
        name: String,
    },

    /// The jitter mode is not one of `none`, `full` or `equal`.
    #[error("invalid jitter mode: {value:?} (expected none, full or equal)")]
    InvalidJitterMode {
        /// The rejected value
        value: String,
    },

    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a [`ConfigError::NegativeDelay`] error.
    pub fn negative_delay(option: impl Into<String>, value_ms: i64) -> Self {
        Self::NegativeDelay {
            option: option.into(),
            value_ms,
        }
    }

    /// Creates a [`ConfigError::InvalidDuration`] error.
    pub fn invalid_duration(option: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidDuration {
            option: option.into(),
            value: value.into(),
        }
    }

    /// Creates a [`ConfigError::WrongType`] error.
    pub fn wrong_type(
        option: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::WrongType {
            option: option.into(),
            expected,
            found,
        }
    }

    /// Creates a [`ConfigError::UnknownPolicy`] error.
    pub fn unknown_policy(name: impl Into<String>) -> Self {
        Self::UnknownPolicy { name: name.into() }
    }

    /// Returns `true` if a delay was rejected for being negative.
    pub fn is_negative_delay(&self) -> bool {
        matches!(self, Self::NegativeDelay { .. })
    }

    /// Returns `true` if the delay range was rejected.
    pub fn is_invalid_range(&self) -> bool {
        matches!(self, Self::InvalidRange { .. })
    }

    /// Returns `true` if the requested policy name is not registered.
    pub fn is_unknown_policy(&self) -> bool {
        matches!(self, Self::UnknownPolicy { .. })
    }

    /// Returns the path of the offending option, if the error is tied to one.
    pub fn option(&self) -> Option<&str> {
        match self {
            Self::NegativeDelay { option, .. }
            | Self::InvalidDuration { option, .. }
            | Self::WrongType { option, .. } => Some(option),
            _ => None,
        }
    }
}

/// Errors returned by the reference reconnection driver.
#[derive(Debug, Error)]
pub enum ReconnectError {
    /// Shutdown was signalled before the endpoint came back.
    #[error("reconnection to {endpoint} aborted by shutdown after {attempts} attempts")]
    Shutdown {
        /// Endpoint that was being reconnected
        endpoint: String,
        /// Connection attempts made before shutdown
        attempts: u32,
    },
}

impl ReconnectError {
    /// Returns `true` if the episode ended because of shutdown.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown { .. })
    }
}
