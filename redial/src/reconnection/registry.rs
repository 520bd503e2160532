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

//! Lookup of reconnection policies by name.
//!
//! The registry is the glue between configuration and policies: it reads the
//! `policy` option of a profile and hands the profile to the matching
//! factory, which validates its own parameters.

use super::constant::ConstantReconnectionPolicy;
use super::exponential::ExponentialReconnectionPolicy;
use super::traits::ReconnectionPolicy;
use crate::config::{ConfigProfile, ReconnectionOption};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "observability")]
use tracing::{debug, error};

/// Policy built when a profile does not name one.
pub const DEFAULT_POLICY: &str = "ExponentialReconnectionPolicy";

/// Builds a policy from a configuration profile.
pub type PolicyFactory = Arc<
    dyn Fn(&dyn ConfigProfile) -> Result<Arc<dyn ReconnectionPolicy>, ConfigError> + Send + Sync,
>;

/// A table of policy factories keyed by case-insensitive name.
///
/// # Examples
///
/// ```
/// use redial::config::{MapProfile, ReconnectionOption};
/// use redial::reconnection::PolicyRegistry;
/// use std::time::Duration;
///
/// let registry = PolicyRegistry::with_defaults();
/// let profile = MapProfile::new("default")
///     .with(ReconnectionOption::Policy, "constant")
///     .with(ReconnectionOption::BaseDelay, "2s");
///
/// let policy = registry.build(&profile).unwrap();
/// assert_eq!(policy.name(), "ConstantReconnectionPolicy");
/// assert_eq!(policy.new_schedule().next_delay(), Duration::from_secs(2));
/// ```
#[derive(Clone, Default)]
pub struct PolicyRegistry {
    factories: HashMap<String, PolicyFactory>,
}

impl PolicyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in constant and exponential
    /// policies, under their full names and the aliases `constant` and
    /// `exponential`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("ConstantReconnectionPolicy", constant_factory);
        registry.register("constant", constant_factory);
        registry.register("ExponentialReconnectionPolicy", exponential_factory);
        registry.register("exponential", exponential_factory);
        registry
    }

    /// Registers a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl AsRef<str>, factory: F)
    where
        F: Fn(&dyn ConfigProfile) -> Result<Arc<dyn ReconnectionPolicy>, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        self.register_factory(name, Arc::new(factory));
    }

    /// Registers an already shared factory under `name`.
    pub fn register_factory(&mut self, name: impl AsRef<str>, factory: PolicyFactory) {
        self.factories.insert(Self::key(name.as_ref()), factory);
    }

    /// Returns `true` if a factory is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&Self::key(name))
    }

    /// Returns the registered names, lowercased and sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Builds the policy named by the profile's `policy` option, or
    /// [`DEFAULT_POLICY`] if it has none.
    pub fn build(
        &self,
        profile: &dyn ConfigProfile,
    ) -> Result<Arc<dyn ReconnectionPolicy>, ConfigError> {
        let name = profile
            .get_string(ReconnectionOption::Policy)?
            .unwrap_or_else(|| DEFAULT_POLICY.to_string());
        self.build_named(&name, profile)
    }

    /// Builds the policy registered under `name` from `profile`.
    pub fn build_named(
        &self,
        name: &str,
        profile: &dyn ConfigProfile,
    ) -> Result<Arc<dyn ReconnectionPolicy>, ConfigError> {
        let factory = self.factories.get(&Self::key(name)).ok_or_else(|| {
            #[cfg(feature = "observability")]
            error!("No reconnection policy registered as '{}'", name);
            ConfigError::unknown_policy(name)
        })?;

        let policy = factory(profile)?;

        #[cfg(feature = "observability")]
        debug!("Built {} for profile '{}'", policy.name(), profile.name());

        Ok(policy)
    }

    fn key(name: &str) -> String {
        name.trim().to_ascii_lowercase()
    }
}

fn constant_factory(
    profile: &dyn ConfigProfile,
) -> Result<Arc<dyn ReconnectionPolicy>, ConfigError> {
    let policy: Arc<dyn ReconnectionPolicy> =
        Arc::new(ConstantReconnectionPolicy::from_profile(profile)?);
    Ok(policy)
}

fn exponential_factory(
    profile: &dyn ConfigProfile,
) -> Result<Arc<dyn ReconnectionPolicy>, ConfigError> {
    let policy: Arc<dyn ReconnectionPolicy> =
        Arc::new(ExponentialReconnectionPolicy::from_profile(profile)?);
    Ok(policy)
}

impl fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("names", &self.names())
            .finish()
    }
}
