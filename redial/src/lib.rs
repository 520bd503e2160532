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

#![doc = include_str!("../../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # redial - Reconnection Scheduling
//!
//! redial decides *when* a client should retry a lost connection to a remote
//! endpoint, for as many attempts as it takes, without the connection loop
//! knowing anything about the retry algorithm.
//!
//! - **Pluggable policies**: constant and exponential backoff out of the box,
//!   custom policies through two small traits
//! - **Per-episode schedules**: every outage gets its own stateful delay
//!   sequence; schedules never share state
//! - **Fail-fast configuration**: parameters are validated once, when the
//!   policy is built
//! - **Deterministic testing**: jitter draws from an injectable, seedable RNG
//!
//! ## Architecture
//!
//! - **[`reconnection`]**: policies, schedules, jitter and the policy registry
//! - **[`config`]**: typed configuration profiles that policies are built from
//! - **[`driver`]**: a reference async reconnection loop (feature `driver`)
//! - **[`error`]**: configuration and driver errors
//!
//! ## Quick Start
//!
//! ```rust
//! use redial::config::{MapProfile, ReconnectionOption};
//! use redial::reconnection::PolicyRegistry;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), redial::ConfigError> {
//! let profile = MapProfile::new("default")
//!     .with(ReconnectionOption::Policy, "exponential")
//!     .with(ReconnectionOption::BaseDelay, "100ms")
//!     .with(ReconnectionOption::MaxDelay, "1600ms");
//!
//! // Built once per client, shared by every connection.
//! let policy = PolicyRegistry::with_defaults().build(&profile)?;
//!
//! // One schedule per outage.
//! let mut schedule = policy.new_schedule();
//! assert_eq!(schedule.next_delay(), Duration::from_millis(100));
//! assert_eq!(schedule.next_delay(), Duration::from_millis(200));
//!
//! // At client shutdown.
//! policy.close();
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Features
//!
//! - **`observability`** (default): Log policy construction and reconnection progress
//!   with `tracing`
//! - **`driver`** (default): Enable the tokio-based reference reconnection loop

pub mod config;
#[cfg(feature = "driver")]
pub mod driver;
pub mod error;
pub mod reconnection;

pub use config::{ConfigProfile, DriverConfig, MapProfile, ReconnectionOption};
pub use error::{ConfigError, ReconnectError};
pub use reconnection::{
    ConstantReconnectionPolicy, ExponentialReconnectionPolicy, JitterMode, PolicyRegistry,
    ReconnectionPolicy, ReconnectionSchedule,
};
