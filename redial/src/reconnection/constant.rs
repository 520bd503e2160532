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

//! Constant reconnection policy.
//!
//! This policy waits the same amount of time before every reconnection
//! attempt.

use super::traits::{ReconnectionPolicy, ReconnectionSchedule};
use crate::config::{ConfigProfile, ReconnectionOption, DEFAULT_BASE_DELAY};
use crate::error::ConfigError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[cfg(feature = "observability")]
use tracing::{debug, warn};

/// A reconnection policy that waits a constant time between attempts.
///
/// # Examples
///
/// ```
/// use redial::config::{MapProfile, ReconnectionOption};
/// use redial::reconnection::{ConstantReconnectionPolicy, ReconnectionPolicy};
/// use std::time::Duration;
///
/// // From a typed value
/// let policy = ConstantReconnectionPolicy::new(Duration::from_millis(500));
/// let mut schedule = policy.new_schedule();
/// assert_eq!(schedule.next_delay(), Duration::from_millis(500));
/// assert_eq!(schedule.next_delay(), Duration::from_millis(500));
///
/// // From configuration; negative delays are rejected
/// let profile = MapProfile::new("default").with(ReconnectionOption::BaseDelay, "-1s");
/// assert!(ConstantReconnectionPolicy::from_profile(&profile).is_err());
/// ```
#[derive(Debug)]
pub struct ConstantReconnectionPolicy {
    /// Delay between reconnection attempts
    delay: Duration,
    /// Set once the policy has been closed
    closed: AtomicBool,
}

impl Default for ConstantReconnectionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY)
    }
}

impl ConstantReconnectionPolicy {
    /// Create a new constant policy with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            closed: AtomicBool::new(false),
        }
    }

    /// Builds the policy from `base_delay` in `profile`.
    ///
    /// Fails with [`ConfigError::NegativeDelay`] if the delay is negative.
    pub fn from_profile(profile: &dyn ConfigProfile) -> Result<Self, ConfigError> {
        let delay = match profile.get_duration(ReconnectionOption::BaseDelay)? {
            Some(raw) => raw.to_delay(ReconnectionOption::BaseDelay)?,
            None => DEFAULT_BASE_DELAY,
        };

        #[cfg(feature = "observability")]
        debug!(
            "Built constant reconnection policy from profile '{}' with delay {:?}",
            profile.name(),
            delay
        );

        Ok(Self::new(delay))
    }

    /// Returns the delay every schedule yields.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns `true` once [`ReconnectionPolicy::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl ReconnectionPolicy for ConstantReconnectionPolicy {
    fn new_schedule(&self) -> Box<dyn ReconnectionSchedule> {
        #[cfg(feature = "observability")]
        if self.is_closed() {
            warn!("New schedule requested from a closed {}", self.name());
        }

        Box::new(ConstantSchedule::new(self.delay))
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            #[cfg(feature = "observability")]
            debug!("Closed {}", self.name());
        }
    }

    fn name(&self) -> &'static str {
        "ConstantReconnectionPolicy"
    }
}

/// Schedule of a [`ConstantReconnectionPolicy`].
#[derive(Debug, Clone)]
pub struct ConstantSchedule {
    delay: Duration,
    attempts: u32,
}

impl ConstantSchedule {
    /// Create a schedule that always yields `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay, attempts: 0 }
    }
}

impl ReconnectionSchedule for ConstantSchedule {
    fn next_delay(&mut self) -> Duration {
        self.attempts = self.attempts.saturating_add(1);
        self.delay
    }

    fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapProfile;

    #[test]
    fn test_default() {
        let policy = ConstantReconnectionPolicy::default();
        assert_eq!(policy.delay(), Duration::from_secs(1));
        assert!(!policy.is_closed());
    }

    #[test]
    fn test_constant_for_many_calls() {
        for millis in [0u64, 1, 250, 1_000, 3_600_000] {
            let delay = Duration::from_millis(millis);
            let policy = ConstantReconnectionPolicy::new(delay);
            let mut schedule = policy.new_schedule();
            for _ in 0..1_000 {
                assert_eq!(schedule.next_delay(), delay);
            }
            assert_eq!(schedule.attempts(), 1_000);
        }
    }

    #[test]
    fn test_from_profile() {
        let profile = MapProfile::new("default").with(ReconnectionOption::BaseDelay, "750ms");
        let policy = ConstantReconnectionPolicy::from_profile(&profile).unwrap();
        assert_eq!(policy.delay(), Duration::from_millis(750));
    }

    #[test]
    fn test_from_profile_uses_default_when_absent() {
        let profile = MapProfile::new("empty");
        let policy = ConstantReconnectionPolicy::from_profile(&profile).unwrap();
        assert_eq!(policy.delay(), DEFAULT_BASE_DELAY);
    }

    #[test]
    fn test_from_profile_zero_is_valid() {
        let profile = MapProfile::new("default").with(ReconnectionOption::BaseDelay, 0i64);
        let policy = ConstantReconnectionPolicy::from_profile(&profile).unwrap();
        assert_eq!(policy.new_schedule().next_delay(), Duration::ZERO);
    }

    #[test]
    fn test_from_profile_rejects_negative() {
        let profile = MapProfile::new("default").with(ReconnectionOption::BaseDelay, -10i64);
        let error = ConstantReconnectionPolicy::from_profile(&profile).unwrap_err();
        assert!(error.is_negative_delay());
        assert_eq!(error.option(), Some("base_delay"));
        assert!(error.to_string().contains("-10"));
    }

    #[test]
    fn test_from_profile_rejects_wrong_type() {
        let profile = MapProfile::new("default").with(ReconnectionOption::BaseDelay, true);
        assert!(matches!(
            ConstantReconnectionPolicy::from_profile(&profile),
            Err(ConfigError::WrongType { .. })
        ));
    }

    #[test]
    fn test_schedules_are_independent() {
        let policy = ConstantReconnectionPolicy::new(Duration::from_millis(10));
        let mut first = policy.new_schedule();
        let mut second = policy.new_schedule();

        first.next_delay();
        first.next_delay();

        assert_eq!(first.attempts(), 2);
        assert_eq!(second.attempts(), 0);
        assert_eq!(second.next_delay(), Duration::from_millis(10));
    }

    #[test]
    fn test_close_is_idempotent() {
        let policy = ConstantReconnectionPolicy::new(Duration::from_millis(10));
        policy.close();
        policy.close();
        assert!(policy.is_closed());
    }

    #[test]
    fn test_name() {
        let policy = ConstantReconnectionPolicy::default();
        assert_eq!(policy.name(), "ConstantReconnectionPolicy");
    }
}
