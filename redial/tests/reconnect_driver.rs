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

//! Integration tests for the reference reconnection loop.
//!
//! Time is paused, so every sleep the driver takes is observable exactly.

#![cfg(feature = "driver")]

use redial::driver::reconnect;
use redial::reconnection::{ExponentialReconnectionPolicy, PolicyRegistry, ReconnectionPolicy};
use redial::{MapProfile, ReconnectError, ReconnectionOption};
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A connect function that fails `failures` times, then succeeds.
fn flaky(failures: u32) -> impl FnMut() -> std::future::Ready<Result<u32, io::Error>> {
    let mut calls = 0;
    move || {
        calls += 1;
        let result = if calls <= failures {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"))
        } else {
            Ok(calls)
        };
        std::future::ready(result)
    }
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_with_configured_policy() {
    init_tracing();

    let profile = MapProfile::new("default")
        .with(ReconnectionOption::Policy, "exponential")
        .with(ReconnectionOption::BaseDelay, "100ms")
        .with(ReconnectionOption::MaxDelay, "1600ms");
    let policy = PolicyRegistry::with_defaults()
        .build(&profile)
        .expect("valid profile");
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let start = Instant::now();
    let connected = reconnect(policy.as_ref(), "10.0.0.1:9042", shutdown_rx, flaky(7))
        .await
        .expect("eventually connects");

    // 100 + 200 + 400 + 800 + 1600 + 1600 + 1600
    assert_eq!(start.elapsed(), Duration::from_millis(6300));
    assert_eq!(connected.value, 8);
    assert_eq!(connected.metrics.total_attempts, 8);
    assert_eq!(connected.metrics.failed_attempts, 7);
    assert_eq!(
        connected.metrics.last_error.as_deref(),
        Some("connection refused")
    );
}

#[tokio::test(start_paused = true)]
async fn test_endpoints_reconnect_independently() {
    init_tracing();

    let policy: Arc<dyn ReconnectionPolicy> = Arc::new(
        ExponentialReconnectionPolicy::builder()
            .base_delay(Duration::from_millis(100))
            .max_delay(Duration::from_secs(10))
            .build()
            .expect("valid parameters"),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut tasks = Vec::new();
    for (endpoint, failures) in [("node1", 1u32), ("node2", 3), ("node3", 5)] {
        let policy = Arc::clone(&policy);
        let shutdown_rx = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            let start = Instant::now();
            let result = reconnect(policy.as_ref(), endpoint, shutdown_rx, flaky(failures)).await;
            (result.map(|c| c.metrics.total_attempts), start.elapsed())
        }));
    }

    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.expect("task panicked"));
    }

    assert_eq!(outcomes[0].0.as_ref().ok(), Some(&2));
    assert_eq!(outcomes[0].1, Duration::from_millis(100));
    assert_eq!(outcomes[1].0.as_ref().ok(), Some(&4));
    assert_eq!(outcomes[1].1, Duration::from_millis(700));
    assert_eq!(outcomes[2].0.as_ref().ok(), Some(&6));
    assert_eq!(outcomes[2].1, Duration::from_millis(3100));

    drop(shutdown_tx);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_aborts_all_episodes() {
    init_tracing();

    let policy: Arc<dyn ReconnectionPolicy> = Arc::new(
        ExponentialReconnectionPolicy::builder()
            .base_delay(Duration::from_secs(1))
            .max_delay(Duration::from_secs(30))
            .build()
            .expect("valid parameters"),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let attempts = Arc::new(AtomicU32::new(0));

    let mut tasks = Vec::new();
    for endpoint in ["node1", "node2"] {
        let policy = Arc::clone(&policy);
        let shutdown_rx = shutdown_rx.clone();
        let attempts = Arc::clone(&attempts);
        tasks.push(tokio::spawn(async move {
            reconnect(policy.as_ref(), endpoint, shutdown_rx, move || {
                attempts.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Err::<(), _>("unreachable"))
            })
            .await
        }));
    }

    // Attempts at t=0, 1s, 3s, 7s for each endpoint; shut down at 10s.
    tokio::time::sleep(Duration::from_secs(10)).await;
    shutdown_tx.send(true).expect("receivers alive");
    policy.close();

    for task in tasks {
        let error = task.await.expect("task panicked").unwrap_err();
        assert!(matches!(error, ReconnectError::Shutdown { attempts: 4, .. }));
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 8);
}
