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

//! Reference reconnection loop.
//!
//! [`reconnect`] drives one reconnection episode for one endpoint: it keeps
//! calling a connect function, sleeping between failures for as long as the
//! episode's [`ReconnectionSchedule`] says, until a connection succeeds or
//! shutdown is signalled. It never spawns tasks; run one call per endpoint
//! on whatever task owns that connection.
//!
//! # Examples
//!
//! ```rust
//! use redial::driver::reconnect;
//! use redial::reconnection::{ConstantReconnectionPolicy, ReconnectionPolicy};
//! use std::time::Duration;
//! use tokio::sync::watch;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let policy = ConstantReconnectionPolicy::new(Duration::from_millis(1));
//! let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//! let mut failures = 2;
//! let connected = reconnect(&policy, "10.0.0.1:9042", shutdown_rx, || {
//!     let result = if failures > 0 {
//!         failures -= 1;
//!         Err("connection refused")
//!     } else {
//!         Ok("session")
//!     };
//!     async move { result }
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(connected.value, "session");
//! assert_eq!(connected.metrics.total_attempts, 3);
//! # }
//! ```

use crate::error::ReconnectError;
use crate::reconnection::{ReconnectionPolicy, ReconnectionSchedule};
use std::fmt;
use std::future::Future;
use tokio::sync::watch;

#[cfg(feature = "observability")]
use tracing::{debug, info, warn};

/// Counters describing one reconnection episode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconnectionMetrics {
    /// Total number of connection attempts
    pub total_attempts: u32,
    /// Number of failed attempts
    pub failed_attempts: u32,
    /// Number of delays taken from the schedule
    pub delays_scheduled: u32,
    /// Last error encountered
    pub last_error: Option<String>,
}

impl ReconnectionMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection attempt.
    pub fn record_attempt(&mut self) {
        self.total_attempts = self.total_attempts.saturating_add(1);
    }

    /// Record a failed attempt.
    pub fn record_failure(&mut self, error: &dyn fmt::Display) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.last_error = Some(error.to_string());
    }

    /// Record a delay handed out by the schedule.
    pub fn record_delay(&mut self) {
        self.delays_scheduled = self.delays_scheduled.saturating_add(1);
    }
}

/// A successful end to a reconnection episode.
#[derive(Debug)]
pub struct Reconnected<T> {
    /// Whatever the connect function produced
    pub value: T,
    /// Counters for the episode
    pub metrics: ReconnectionMetrics,
}

/// Runs one reconnection episode against `endpoint`.
///
/// `connect` is called immediately. On failure, a schedule is taken from
/// `policy` and the loop sleeps for each of its delays before trying again.
/// The schedule is created at most once and dropped when the episode ends.
///
/// The episode ends with [`ReconnectError::Shutdown`] as soon as `shutdown`
/// holds `true` or its sender is dropped, including mid-sleep.
pub async fn reconnect<P, F, Fut, T, E>(
    policy: &P,
    endpoint: &str,
    mut shutdown: watch::Receiver<bool>,
    mut connect: F,
) -> Result<Reconnected<T>, ReconnectError>
where
    P: ReconnectionPolicy + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut metrics = ReconnectionMetrics::new();
    let mut schedule: Option<Box<dyn ReconnectionSchedule>> = None;

    loop {
        let stopped = *shutdown.borrow();
        if stopped {
            return Err(aborted(endpoint, &metrics));
        }

        metrics.record_attempt();
        match connect().await {
            Ok(value) => {
                #[cfg(feature = "observability")]
                info!(
                    "Reconnected to {} after {} attempt(s)",
                    endpoint, metrics.total_attempts
                );
                return Ok(Reconnected { value, metrics });
            }
            Err(error) => {
                metrics.record_failure(&error);

                let schedule = schedule.get_or_insert_with(|| {
                    #[cfg(feature = "observability")]
                    debug!("Starting {} schedule for {}", policy.name(), endpoint);
                    policy.new_schedule()
                });
                let delay = schedule.next_delay();
                metrics.record_delay();

                #[cfg(feature = "observability")]
                warn!(
                    "Connection to {} failed (attempt {}): {}; retrying in {:?}",
                    endpoint, metrics.total_attempts, error, delay
                );

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = wait_for_shutdown(&mut shutdown) => {
                        return Err(aborted(endpoint, &metrics));
                    }
                }
            }
        }
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender counts as shutdown.
    let _ = shutdown.wait_for(|stop| *stop).await;
}

fn aborted(endpoint: &str, metrics: &ReconnectionMetrics) -> ReconnectError {
    #[cfg(feature = "observability")]
    info!(
        "Reconnection to {} aborted by shutdown after {} attempt(s)",
        endpoint, metrics.total_attempts
    );
    ReconnectError::Shutdown {
        endpoint: endpoint.to_string(),
        attempts: metrics.total_attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconnection::{ConstantReconnectionPolicy, ExponentialReconnectionPolicy};
    use std::time::Duration;
    use tokio::time::Instant;

    #[test]
    fn test_metrics_new() {
        let metrics = ReconnectionMetrics::new();
        assert_eq!(metrics.total_attempts, 0);
        assert_eq!(metrics.failed_attempts, 0);
        assert_eq!(metrics.delays_scheduled, 0);
        assert!(metrics.last_error.is_none());
    }

    #[test]
    fn test_metrics_record_failure() {
        let mut metrics = ReconnectionMetrics::new();
        metrics.record_attempt();
        metrics.record_failure(&"refused");
        assert_eq!(metrics.total_attempts, 1);
        assert_eq!(metrics.failed_attempts, 1);
        assert_eq!(metrics.last_error.as_deref(), Some("refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_takes_no_schedule() {
        let policy = ConstantReconnectionPolicy::new(Duration::from_secs(5));
        let (_tx, rx) = watch::channel(false);
        let start = Instant::now();

        let result = reconnect(&policy, "node1", rx, || async { Ok::<_, String>(7) })
            .await
            .unwrap();

        assert_eq!(result.value, 7);
        assert_eq!(result.metrics.total_attempts, 1);
        assert_eq!(result.metrics.delays_scheduled, 0);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_scheduled_delays() {
        let policy = ExponentialReconnectionPolicy::builder()
            .base_delay(Duration::from_millis(100))
            .max_delay(Duration::from_millis(1600))
            .build()
            .unwrap();
        let (_tx, rx) = watch::channel(false);
        let start = Instant::now();

        let mut remaining_failures = 4;
        let result = reconnect(&policy, "node1", rx, || {
            let outcome = if remaining_failures > 0 {
                remaining_failures -= 1;
                Err("refused")
            } else {
                Ok(())
            };
            async move { outcome }
        })
        .await
        .unwrap();

        // 100 + 200 + 400 + 800
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
        assert_eq!(result.metrics.total_attempts, 5);
        assert_eq!(result.metrics.failed_attempts, 4);
        assert_eq!(result.metrics.delays_scheduled, 4);
        assert_eq!(result.metrics.last_error.as_deref(), Some("refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_first_attempt() {
        let policy = ConstantReconnectionPolicy::new(Duration::from_secs(1));
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let error = reconnect(&policy, "node1", rx, || async { Ok::<_, String>(()) })
            .await
            .unwrap_err();
        assert!(matches!(error, ReconnectError::Shutdown { attempts: 0, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_sleep() {
        let policy = ConstantReconnectionPolicy::new(Duration::from_secs(3600));
        let (tx, rx) = watch::channel(false);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            tx.send(true).unwrap();
        });

        let start = Instant::now();
        let error = reconnect(&policy, "node1", rx, || async { Err::<(), _>("down") })
            .await
            .unwrap_err();

        stopper.await.unwrap();
        assert!(error.is_shutdown());
        assert_eq!(start.elapsed(), Duration::from_secs(10));
        assert!(matches!(error, ReconnectError::Shutdown { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_counts_as_shutdown() {
        let policy = ConstantReconnectionPolicy::new(Duration::from_secs(60));
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let error = reconnect(&policy, "node1", rx, || async { Err::<(), _>("down") })
            .await
            .unwrap_err();
        assert!(error.is_shutdown());
    }
}
