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

//! Reconnection policies and schedules.
//!
//! This module provides pluggable policies that decide how long a client
//! waits between attempts to re-establish a lost connection. A policy is
//! built once per client and shared by every connection; each outage gets
//! its own schedule.
//!
//! # Available Policies
//!
//! - [`ExponentialReconnectionPolicy`]: Doubles the delay up to a ceiling, with optional
//!   jitter (default)
//! - [`ConstantReconnectionPolicy`]: Uses a constant delay between attempts
//!
//! Custom policies implement [`ReconnectionPolicy`] and [`ReconnectionSchedule`]
//! and can be made available to configuration through [`PolicyRegistry`].
//!
//! # Examples
//!
//! ## Using Exponential Backoff
//!
//! ```
//! use redial::reconnection::{ExponentialReconnectionPolicy, JitterMode, ReconnectionPolicy};
//! use std::time::Duration;
//!
//! let policy = ExponentialReconnectionPolicy::builder()
//!     .base_delay(Duration::from_millis(100))
//!     .max_delay(Duration::from_secs(30))
//!     .jitter(JitterMode::Full)
//!     .build()
//!     .unwrap();
//!
//! let mut schedule = policy.new_schedule();
//! assert!(schedule.next_delay() <= Duration::from_millis(100));
//! ```
//!
//! ## Using a Constant Delay
//!
//! ```
//! use redial::reconnection::ConstantReconnectionPolicy;
//! use std::time::Duration;
//!
//! let policy = ConstantReconnectionPolicy::new(Duration::from_secs(5));
//! ```
//!
//! ## Building from Configuration
//!
//! ```
//! use redial::config::{MapProfile, ReconnectionOption};
//! use redial::reconnection::PolicyRegistry;
//!
//! let profile = MapProfile::new("default")
//!     .with(ReconnectionOption::Policy, "exponential")
//!     .with(ReconnectionOption::BaseDelay, "250ms")
//!     .with(ReconnectionOption::MaxDelay, "30s")
//!     .with(ReconnectionOption::JitterEnabled, true);
//!
//! let policy = PolicyRegistry::with_defaults().build(&profile).unwrap();
//! assert_eq!(policy.name(), "ExponentialReconnectionPolicy");
//! ```

mod constant;
mod exponential;
mod jitter;
mod registry;
mod traits;

pub use constant::{ConstantReconnectionPolicy, ConstantSchedule};
pub use exponential::{
    ExponentialReconnectionPolicy, ExponentialReconnectionPolicyBuilder, ExponentialSchedule,
};
pub use jitter::{JitterMode, JitterSource};
pub use registry::{PolicyFactory, PolicyRegistry, DEFAULT_POLICY};
pub use traits::{ReconnectionPolicy, ReconnectionSchedule};
