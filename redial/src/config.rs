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

//! Configuration boundary for reconnection policies.
//!
//! Policies never reach into ambient configuration themselves. Callers resolve
//! a [`ConfigProfile`] (any typed key/value lookup) and hand it to a policy's
//! `from_profile` constructor or to the [`PolicyRegistry`]. This module also
//! provides [`MapProfile`] and [`DriverConfig`], a serde-backed implementation
//! with named profiles that fall back to a default profile.
//!
//! # Examples
//!
//! ```rust
//! use redial::config::{ConfigProfile, DriverConfig, ReconnectionOption};
//! use std::time::Duration;
//!
//! let config = DriverConfig::from_json_str(r#"{
//!     "default": { "policy": "exponential", "base_delay": "100ms", "max_delay": "10s" },
//!     "profiles": { "slow": { "base_delay": "2s" } }
//! }"#).unwrap();
//!
//! let slow = config.profile("slow").unwrap();
//! let base = slow.get_duration(ReconnectionOption::BaseDelay).unwrap().unwrap();
//! assert_eq!(base.to_delay(ReconnectionOption::BaseDelay).unwrap(), Duration::from_secs(2));
//!
//! // Missing keys fall back to the default profile.
//! let policy = slow.get_string(ReconnectionOption::Policy).unwrap();
//! assert_eq!(policy.as_deref(), Some("exponential"));
//! ```
//!
//! [`PolicyRegistry`]: crate::reconnection::PolicyRegistry

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Value of [`ReconnectionOption::BaseDelay`] when a profile does not set it.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Value of [`ReconnectionOption::MaxDelay`] when a profile does not set it.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Options recognized by the built-in reconnection policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconnectionOption {
    /// Name of the policy to build (string)
    Policy,
    /// Base delay between attempts (duration)
    BaseDelay,
    /// Ceiling for backoff delays (duration)
    MaxDelay,
    /// Whether backoff delays are randomized (bool)
    JitterEnabled,
    /// Jitter flavour: `none`, `full` or `equal` (string)
    JitterMode,
    /// Seed for the jitter random source (integer)
    JitterSeed,
}

impl ReconnectionOption {
    /// Every option, in declaration order.
    pub const ALL: [ReconnectionOption; 6] = [
        Self::Policy,
        Self::BaseDelay,
        Self::MaxDelay,
        Self::JitterEnabled,
        Self::JitterMode,
        Self::JitterSeed,
    ];

    /// Returns the key this option is stored under.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::BaseDelay => "base_delay",
            Self::MaxDelay => "max_delay",
            Self::JitterEnabled => "jitter_enabled",
            Self::JitterMode => "jitter_mode",
            Self::JitterSeed => "jitter_seed",
        }
    }
}

impl fmt::Display for ReconnectionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A raw duration as read from configuration.
///
/// Configuration sources may hold negative durations; rejecting them is the
/// job of the policy being built, which knows which option it is validating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfigDuration {
    millis: i64,
}

impl ConfigDuration {
    /// Creates a duration from signed milliseconds.
    pub const fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    /// Returns the duration in signed milliseconds.
    pub const fn as_millis(&self) -> i64 {
        self.millis
    }

    /// Returns `true` if the duration is below zero.
    pub const fn is_negative(&self) -> bool {
        self.millis < 0
    }

    /// Converts to a [`Duration`], failing with
    /// [`ConfigError::NegativeDelay`] for negative values.
    pub fn to_delay(self, option: ReconnectionOption) -> Result<Duration, ConfigError> {
        u64::try_from(self.millis)
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::negative_delay(option.path(), self.millis))
    }

    /// Parses a human-readable duration such as `"250ms"`, `"1.5s"`,
    /// `"-2 seconds"` or `"100"` (bare numbers are milliseconds).
    pub fn parse(option: ReconnectionOption, raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::invalid_duration(option.path(), raw);

        let text = raw.trim();
        let (sign, text) = match text.strip_prefix('-') {
            Some(rest) => (-1.0, rest.trim_start()),
            None => (1.0, text),
        };

        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);
        if number.is_empty() {
            return Err(invalid());
        }

        let value: f64 = number.parse().map_err(|_| invalid())?;
        let factor = unit_millis(unit.trim()).ok_or_else(invalid)?;
        let millis = (sign * value * factor).round();

        if !millis.is_finite() || millis < i64::MIN as f64 || millis > i64::MAX as f64 {
            return Err(invalid());
        }
        Ok(Self::from_millis(millis as i64))
    }
}

impl From<Duration> for ConfigDuration {
    fn from(duration: Duration) -> Self {
        Self::from_millis(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
    }
}

fn unit_millis(unit: &str) -> Option<f64> {
    let factor = match unit {
        "" | "ms" | "milli" | "millis" | "millisecond" | "milliseconds" => 1.0,
        "s" | "second" | "seconds" => 1_000.0,
        "m" | "minute" | "minutes" => 60_000.0,
        "h" | "hour" | "hours" => 3_600_000.0,
        "d" | "day" | "days" => 86_400_000.0,
        _ => return None,
    };
    Some(factor)
}

/// A single configured value.
///
/// Durations are stored either as integer milliseconds or as strings parsed
/// by [`ConfigDuration::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// A boolean flag
    Bool(bool),
    /// An integer (milliseconds when read as a duration)
    Integer(i64),
    /// A string
    String(String),
}

impl ConfigValue {
    /// Returns a short name of the value's type for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Duration> for ConfigValue {
    fn from(value: Duration) -> Self {
        Self::Integer(ConfigDuration::from(value).as_millis())
    }
}

/// A named, typed view over reconnection configuration.
///
/// Only [`ConfigProfile::name`] and [`ConfigProfile::value`] are required; the
/// typed accessors are derived from them. Each accessor returns `Ok(None)` when
/// the option is absent and [`ConfigError::WrongType`] when it holds a value of
/// another type.
pub trait ConfigProfile: Send + Sync {
    /// Name of this profile, for diagnostics.
    fn name(&self) -> &str;

    /// Raw lookup of an option.
    fn value(&self, option: ReconnectionOption) -> Option<&ConfigValue>;

    /// Reads a duration option.
    fn get_duration(
        &self,
        option: ReconnectionOption,
    ) -> Result<Option<ConfigDuration>, ConfigError> {
        match self.value(option) {
            None => Ok(None),
            Some(ConfigValue::Integer(millis)) => Ok(Some(ConfigDuration::from_millis(*millis))),
            Some(ConfigValue::String(raw)) => ConfigDuration::parse(option, raw).map(Some),
            Some(other) => Err(ConfigError::wrong_type(
                option.path(),
                "duration",
                other.type_name(),
            )),
        }
    }

    /// Reads a boolean option.
    fn get_bool(&self, option: ReconnectionOption) -> Result<Option<bool>, ConfigError> {
        match self.value(option) {
            None => Ok(None),
            Some(ConfigValue::Bool(flag)) => Ok(Some(*flag)),
            Some(other) => Err(ConfigError::wrong_type(
                option.path(),
                "bool",
                other.type_name(),
            )),
        }
    }

    /// Reads a string option.
    fn get_string(&self, option: ReconnectionOption) -> Result<Option<String>, ConfigError> {
        match self.value(option) {
            None => Ok(None),
            Some(ConfigValue::String(text)) => Ok(Some(text.clone())),
            Some(other) => Err(ConfigError::wrong_type(
                option.path(),
                "string",
                other.type_name(),
            )),
        }
    }

    /// Reads an integer option.
    fn get_integer(&self, option: ReconnectionOption) -> Result<Option<i64>, ConfigError> {
        match self.value(option) {
            None => Ok(None),
            Some(ConfigValue::Integer(number)) => Ok(Some(*number)),
            Some(other) => Err(ConfigError::wrong_type(
                option.path(),
                "integer",
                other.type_name(),
            )),
        }
    }
}

/// An in-memory [`ConfigProfile`] backed by a map of option keys.
///
/// A profile may carry a fallback; options it does not define are looked up
/// there.
///
/// # Examples
///
/// ```rust
/// use redial::config::{ConfigProfile, MapProfile, ReconnectionOption};
/// use std::time::Duration;
///
/// let profile = MapProfile::new("default")
///     .with(ReconnectionOption::BaseDelay, Duration::from_millis(500))
///     .with(ReconnectionOption::JitterEnabled, true);
///
/// assert_eq!(profile.get_bool(ReconnectionOption::JitterEnabled).unwrap(), Some(true));
/// assert!(profile.get_string(ReconnectionOption::Policy).unwrap().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapProfile {
    name: String,
    values: HashMap<String, ConfigValue>,
    fallback: Option<Arc<MapProfile>>,
}

impl MapProfile {
    /// Creates an empty profile.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
            fallback: None,
        }
    }

    /// Creates a profile from raw key/value pairs.
    pub fn from_values(name: impl Into<String>, values: HashMap<String, ConfigValue>) -> Self {
        Self {
            name: name.into(),
            values,
            fallback: None,
        }
    }

    /// Sets an option, returning the profile.
    pub fn with(mut self, option: ReconnectionOption, value: impl Into<ConfigValue>) -> Self {
        self.set(option, value);
        self
    }

    /// Sets the profile consulted for options this one does not define.
    pub fn with_fallback(mut self, fallback: Arc<MapProfile>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Sets an option in place.
    pub fn set(&mut self, option: ReconnectionOption, value: impl Into<ConfigValue>) {
        self.values.insert(option.path().to_string(), value.into());
    }

    /// Removes an option defined directly on this profile.
    pub fn remove(&mut self, option: ReconnectionOption) -> Option<ConfigValue> {
        self.values.remove(option.path())
    }

    /// Returns `true` if the option is defined on this profile or its fallback.
    pub fn contains(&self, option: ReconnectionOption) -> bool {
        self.value(option).is_some()
    }
}

impl ConfigProfile for MapProfile {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self, option: ReconnectionOption) -> Option<&ConfigValue> {
        self.values
            .get(option.path())
            .or_else(|| self.fallback.as_deref().and_then(|f| f.value(option)))
    }
}

/// Name of the profile every other profile falls back to.
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Default, Deserialize)]
struct RawDriverConfig {
    #[serde(default)]
    default: HashMap<String, ConfigValue>,
    #[serde(default)]
    profiles: HashMap<String, HashMap<String, ConfigValue>>,
}

/// A set of named configuration profiles.
///
/// Every named profile falls back to the default profile for options it does
/// not define.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    default: Arc<MapProfile>,
    profiles: HashMap<String, Arc<MapProfile>>,
}

impl DriverConfig {
    /// Creates a configuration with only a default profile.
    pub fn new(default: MapProfile) -> Self {
        Self {
            default: Arc::new(default),
            profiles: HashMap::new(),
        }
    }

    /// Parses a JSON document of the form
    /// `{"default": {...}, "profiles": {"name": {...}}}`.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawDriverConfig = serde_json::from_str(json)?;
        let mut config = Self::new(MapProfile::from_values(DEFAULT_PROFILE, raw.default));
        for (name, values) in raw.profiles {
            let profile = MapProfile::from_values(name.clone(), values);
            config = config.with_profile(name, profile);
        }
        Ok(config)
    }

    /// Adds a named profile layered over the default profile.
    pub fn with_profile(mut self, name: impl Into<String>, profile: MapProfile) -> Self {
        let profile = profile.with_fallback(Arc::clone(&self.default));
        self.profiles.insert(name.into(), Arc::new(profile));
        self
    }

    /// Returns the default profile.
    pub fn default_profile(&self) -> Arc<MapProfile> {
        Arc::clone(&self.default)
    }

    /// Returns a named profile. The name `"default"` returns the default profile.
    pub fn profile(&self, name: &str) -> Option<Arc<MapProfile>> {
        if name == DEFAULT_PROFILE {
            return Some(self.default_profile());
        }
        self.profiles.get(name).cloned()
    }

    /// Returns the names of all non-default profiles.
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new(MapProfile::new(DEFAULT_PROFILE))
    }
}
