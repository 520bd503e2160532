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

//! Exponential backoff reconnection policy.
//!
//! The delay before attempt `n` (1-based) is `min(base * 2^(n-1), max)`,
//! optionally randomized by a [`JitterMode`]. Doubling stops once the ceiling
//! is reached, so the schedule never overflows no matter how long it runs.

use super::jitter::{duration_from_nanos, JitterMode, JitterSource};
use super::traits::{ReconnectionPolicy, ReconnectionSchedule};
use crate::config::{ConfigProfile, ReconnectionOption, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY};
use crate::error::ConfigError;
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[cfg(feature = "observability")]
use tracing::{debug, warn};

/// Unjittered delay after `exponent` doublings of `base`, capped at `max`.
fn capped_delay(base: Duration, max: Duration, exponent: u32) -> Duration {
    if base.is_zero() {
        return Duration::ZERO;
    }
    1u128
        .checked_shl(exponent)
        .and_then(|factor| base.as_nanos().checked_mul(factor))
        .filter(|nanos| *nanos < max.as_nanos())
        .map_or(max, duration_from_nanos)
}

/// Doubles `delay`, capped at `max`.
fn doubled(delay: Duration, max: Duration) -> Duration {
    delay.checked_mul(2).map_or(max, |next| next.min(max))
}

/// Exponential backoff reconnection policy.
///
/// # Examples
///
/// ```
/// use redial::reconnection::{ExponentialReconnectionPolicy, ReconnectionPolicy};
/// use std::time::Duration;
///
/// let policy = ExponentialReconnectionPolicy::builder()
///     .base_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_millis(1600))
///     .build()
///     .unwrap();
///
/// let mut schedule = policy.new_schedule();
/// let delays: Vec<u128> = (0..7).map(|_| schedule.next_delay().as_millis()).collect();
/// assert_eq!(delays, vec![100, 200, 400, 800, 1600, 1600, 1600]);
/// ```
#[derive(Debug)]
pub struct ExponentialReconnectionPolicy {
    /// Delay before the first retry
    base_delay: Duration,
    /// Ceiling for every delay
    max_delay: Duration,
    /// Randomization applied to computed delays
    jitter: JitterMode,
    /// Randomness handed to each schedule
    source: JitterSource,
    /// Set once the policy has been closed
    closed: AtomicBool,
}

impl Default for ExponentialReconnectionPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter: JitterMode::None,
            source: JitterSource::Entropy,
            closed: AtomicBool::new(false),
        }
    }
}

impl ExponentialReconnectionPolicy {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialReconnectionPolicyBuilder {
        ExponentialReconnectionPolicyBuilder::default()
    }

    /// Builds the policy from `base_delay`, `max_delay`, `jitter_enabled`,
    /// `jitter_mode` and `jitter_seed` in `profile`.
    ///
    /// `jitter_mode` wins over `jitter_enabled` when both are set.
    pub fn from_profile(profile: &dyn ConfigProfile) -> Result<Self, ConfigError> {
        let base_delay = match profile.get_duration(ReconnectionOption::BaseDelay)? {
            Some(raw) => raw.to_delay(ReconnectionOption::BaseDelay)?,
            None => DEFAULT_BASE_DELAY,
        };
        let max_delay = match profile.get_duration(ReconnectionOption::MaxDelay)? {
            Some(raw) => raw.to_delay(ReconnectionOption::MaxDelay)?,
            None => DEFAULT_MAX_DELAY,
        };

        let jitter: JitterMode = match profile.get_string(ReconnectionOption::JitterMode)? {
            Some(mode) => mode.parse()?,
            None => match profile.get_bool(ReconnectionOption::JitterEnabled)? {
                Some(true) => JitterMode::Full,
                Some(false) | None => JitterMode::None,
            },
        };

        let source = match profile.get_integer(ReconnectionOption::JitterSeed)? {
            // Negative seeds keep their bit pattern.
            Some(seed) => JitterSource::Seeded(u64::from_ne_bytes(seed.to_ne_bytes())),
            None => JitterSource::Entropy,
        };

        let policy = Self::builder()
            .base_delay(base_delay)
            .max_delay(max_delay)
            .jitter(jitter)
            .source(source)
            .build()?;

        #[cfg(feature = "observability")]
        debug!(
            "Built exponential reconnection policy from profile '{}' \
             (base {:?}, max {:?}, jitter {})",
            profile.name(),
            policy.base_delay,
            policy.max_delay,
            policy.jitter
        );

        Ok(policy)
    }

    /// Returns the delay before the first retry.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the delay ceiling.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Returns the jitter mode.
    pub fn jitter(&self) -> JitterMode {
        self.jitter
    }

    /// Returns the unjittered delay before attempt `attempt` (1-based).
    ///
    /// Attempt `0` is treated as attempt `1`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        capped_delay(self.base_delay, self.max_delay, attempt.saturating_sub(1))
    }

    /// Returns `true` once [`ReconnectionPolicy::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl ReconnectionPolicy for ExponentialReconnectionPolicy {
    fn new_schedule(&self) -> Box<dyn ReconnectionSchedule> {
        #[cfg(feature = "observability")]
        if self.is_closed() {
            warn!("New schedule requested from a closed {}", self.name());
        }

        Box::new(ExponentialSchedule::with_rng(
            self.base_delay,
            self.max_delay,
            self.jitter,
            self.source.rng(),
        ))
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            #[cfg(feature = "observability")]
            debug!("Closed {}", self.name());
        }
    }

    fn name(&self) -> &'static str {
        "ExponentialReconnectionPolicy"
    }
}

/// Builder for configuring an [`ExponentialReconnectionPolicy`].
#[derive(Debug, Clone)]
pub struct ExponentialReconnectionPolicyBuilder {
    base_delay: Duration,
    max_delay: Duration,
    jitter: JitterMode,
    source: JitterSource,
}

impl Default for ExponentialReconnectionPolicyBuilder {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter: JitterMode::None,
            source: JitterSource::Entropy,
        }
    }
}

impl ExponentialReconnectionPolicyBuilder {
    /// Set the delay before the first retry.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the jitter mode.
    pub fn jitter(mut self, jitter: JitterMode) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set where schedules draw their randomness from.
    pub fn source(mut self, source: JitterSource) -> Self {
        self.source = source;
        self
    }

    /// Seed every schedule's generator with `seed`.
    pub fn seed(self, seed: u64) -> Self {
        self.source(JitterSource::Seeded(seed))
    }

    /// Validate the parameters and build the policy.
    ///
    /// Fails with [`ConfigError::InvalidRange`] if `max_delay < base_delay`.
    pub fn build(self) -> Result<ExponentialReconnectionPolicy, ConfigError> {
        if self.max_delay < self.base_delay {
            return Err(ConfigError::InvalidRange {
                base: self.base_delay,
                max: self.max_delay,
            });
        }

        Ok(ExponentialReconnectionPolicy {
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            jitter: self.jitter,
            source: self.source,
            closed: AtomicBool::new(false),
        })
    }
}

/// Schedule of an [`ExponentialReconnectionPolicy`].
#[derive(Debug, Clone)]
pub struct ExponentialSchedule {
    max_delay: Duration,
    jitter: JitterMode,
    /// Unjittered delay handed out by the next call
    current: Duration,
    attempts: u32,
    rng: StdRng,
}

impl ExponentialSchedule {
    /// Create a schedule drawing jitter from the given generator.
    pub fn with_rng(
        base_delay: Duration,
        max_delay: Duration,
        jitter: JitterMode,
        rng: StdRng,
    ) -> Self {
        Self {
            max_delay,
            jitter,
            current: base_delay.min(max_delay),
            attempts: 0,
            rng,
        }
    }

    /// Returns `true` once delays have stopped growing.
    pub fn is_saturated(&self) -> bool {
        self.current.is_zero() || self.current >= self.max_delay
    }
}

impl ReconnectionSchedule for ExponentialSchedule {
    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        if !self.is_saturated() {
            self.current = doubled(delay, self.max_delay);
        }
        self.attempts = self.attempts.saturating_add(1);
        self.jitter.apply(delay, &mut self.rng)
    }

    fn attempts(&self) -> u32 {
        self.attempts
    }
}
