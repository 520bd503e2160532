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

//! Reconnection policy and schedule traits.
//!
//! A reconnection strategy is split in two capabilities:
//!
//! - [`ReconnectionPolicy`] is long-lived, immutable, and shared by every
//!   connection of a client. Its only job is to hand out schedules.
//! - [`ReconnectionSchedule`] is created when a connection goes down and is
//!   owned by the single loop retrying that connection. Each call to
//!   [`ReconnectionSchedule::next_delay`] yields the wait before the next
//!   attempt.

use std::fmt;
use std::time::Duration;

/// A factory of reconnection schedules, shared across all connections.
///
/// Implementations validate their parameters when constructed, so producing a
/// schedule never fails.
///
/// # Examples
///
/// ```
/// use redial::reconnection::{ConstantReconnectionPolicy, ReconnectionPolicy};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let policy: Arc<dyn ReconnectionPolicy> =
///     Arc::new(ConstantReconnectionPolicy::new(Duration::from_secs(2)));
///
/// let mut schedule = policy.new_schedule();
/// assert_eq!(schedule.next_delay(), Duration::from_secs(2));
///
/// policy.close();
/// ```
pub trait ReconnectionPolicy: Send + Sync + fmt::Debug {
    /// Creates a new schedule for one reconnection episode.
    ///
    /// Safe to call concurrently. The returned schedule shares no mutable
    /// state with the policy or with any other schedule.
    fn new_schedule(&self) -> Box<dyn ReconnectionSchedule>;

    /// Releases the policy at client shutdown.
    ///
    /// Idempotent. Callers must not ask for new schedules afterwards.
    fn close(&self);

    /// Get a human-readable name for this policy.
    ///
    /// Used for logging and by the policy registry.
    fn name(&self) -> &'static str;
}

/// The delays of a single reconnection episode.
///
/// A schedule is owned by one reconnection loop and is not internally
/// synchronized. Its sequence is infinite; the owner drops it once the
/// connection is back.
pub trait ReconnectionSchedule: Send + fmt::Debug {
    /// Returns how long to wait before the next attempt and advances the
    /// schedule.
    fn next_delay(&mut self) -> Duration;

    /// Number of delays produced so far.
    fn attempts(&self) -> u32;
}
