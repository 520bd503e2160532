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

//! Jitter applied to backoff delays.
//!
//! When many clients lose the same node at once, un-jittered backoff makes
//! them all retry in lockstep. [`JitterMode`] spreads those retries out:
//!
//! - [`JitterMode::None`]: the computed delay, unchanged
//! - [`JitterMode::Full`]: uniform in `[0, delay]`
//! - [`JitterMode::Equal`]: uniform in `[delay / 2, delay]`
//!
//! Randomness always comes from an explicit [`Rng`] so schedules can be made
//! reproducible with a [`JitterSource::Seeded`] source.

use crate::error::ConfigError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a computed backoff delay is randomized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JitterMode {
    /// Use the computed delay as is.
    #[default]
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// Uniform in `[delay / 2, delay]`.
    Equal,
}

impl JitterMode {
    /// Applies this jitter mode to `delay`, drawing from `rng`.
    ///
    /// The result never exceeds `delay`.
    pub fn apply<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        let nanos = delay.as_nanos();
        match self {
            Self::None => delay,
            Self::Full => duration_from_nanos(rng.gen_range(0..=nanos)),
            // Round the lower bound up so odd values never dip below delay / 2.
            Self::Equal => duration_from_nanos(rng.gen_range(nanos - nanos / 2..=nanos)),
        }
    }

    /// Returns the lowercase name used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Full => "full",
            Self::Equal => "equal",
        }
    }
}

impl fmt::Display for JitterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JitterMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "full" => Ok(Self::Full),
            "equal" => Ok(Self::Equal),
            _ => Err(ConfigError::InvalidJitterMode {
                value: s.to_string(),
            }),
        }
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Rebuilds a [`Duration`] from a nanosecond count, saturating at
/// [`Duration::MAX`].
pub(crate) fn duration_from_nanos(nanos: u128) -> Duration {
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    u64::try_from(nanos / NANOS_PER_SEC)
        .map_or(Duration::MAX, |secs| Duration::new(secs, subsec))
}

/// Where jittered schedules get their randomness from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JitterSource {
    /// A fresh OS-seeded generator per schedule.
    #[default]
    Entropy,
    /// A generator seeded with this value. Every schedule built from the
    /// same seed yields the same sequence.
    Seeded(u64),
}

impl JitterSource {
    /// Creates the generator for one schedule.
    pub fn rng(&self) -> StdRng {
        match self {
            Self::Entropy => StdRng::from_entropy(),
            Self::Seeded(seed) => StdRng::seed_from_u64(*seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        let delay = Duration::from_millis(1234);
        assert_eq!(JitterMode::None.apply(delay, &mut rng), delay);
    }

    #[test]
    fn test_full_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let delay = Duration::from_millis(1000);
        for _ in 0..1000 {
            assert!(JitterMode::Full.apply(delay, &mut rng) <= delay);
        }
    }

    #[test]
    fn test_equal_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for millis in [1u64, 3, 101, 1000] {
            let delay = Duration::from_millis(millis);
            for _ in 0..500 {
                let jittered = JitterMode::Equal.apply(delay, &mut rng);
                assert!(jittered >= delay / 2, "{jittered:?} < half of {delay:?}");
                assert!(jittered <= delay);
            }
        }
    }

    #[test]
    fn test_bounds_hold_for_longest_delay() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let equal = JitterMode::Equal.apply(Duration::MAX, &mut rng);
            assert!(equal >= Duration::MAX / 2, "{equal:?} < half of Duration::MAX");
            assert!(JitterMode::Full.apply(Duration::MAX, &mut rng) <= Duration::MAX);
        }
    }

    #[test]
    fn test_duration_from_nanos() {
        assert_eq!(duration_from_nanos(0), Duration::ZERO);
        assert_eq!(duration_from_nanos(1_500_000_000), Duration::from_millis(1500));
        assert_eq!(duration_from_nanos(Duration::MAX.as_nanos()), Duration::MAX);
        assert_eq!(duration_from_nanos(u128::MAX), Duration::MAX);
    }

    #[test]
    fn test_zero_delay() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(JitterMode::Full.apply(Duration::ZERO, &mut rng), Duration::ZERO);
        assert_eq!(JitterMode::Equal.apply(Duration::ZERO, &mut rng), Duration::ZERO);
    }

    #[test]
    fn test_parse() {
        assert_eq!("none".parse::<JitterMode>().unwrap(), JitterMode::None);
        assert_eq!("Full".parse::<JitterMode>().unwrap(), JitterMode::Full);
        assert_eq!(" equal ".parse::<JitterMode>().unwrap(), JitterMode::Equal);
        assert!(matches!(
            "decorrelated".parse::<JitterMode>(),
            Err(ConfigError::InvalidJitterMode { .. })
        ));
        for mode in [JitterMode::None, JitterMode::Full, JitterMode::Equal] {
            assert_eq!(mode.to_string().parse::<JitterMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let source = JitterSource::Seeded(99);
        let delay = Duration::from_secs(10);
        let mut a = source.rng();
        let mut b = source.rng();
        for _ in 0..100 {
            assert_eq!(
                JitterMode::Full.apply(delay, &mut a),
                JitterMode::Full.apply(delay, &mut b)
            );
        }
    }
}
