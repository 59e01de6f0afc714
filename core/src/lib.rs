//! Wireless link supervisor with dependent time acquisition
//!
//! Keeps a WiFi station associated, retrying at a fixed pace when the link
//! drops, and acquires wall clock time once the link is up. Radio and clock
//! access go through the `hal-abstractions` traits, so the same logic runs
//! on bare metal (embassy) and on hosted targets (ESP-IDF, host tests).
//!
//! ## Architecture
//! - [`connection`]: reconnection state machine and retry pacing
//! - [`time_sync`]: time acquisition gated on the link
//! - [`supervisor`]: application facade owning both plus the drivers
//! - [`runner`]: the periodic loop driving the facade
//! - [`wallclock`]: clock service for targets without an OS clock

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

#[macro_use]
mod fmt;

pub mod config;
pub mod connection;
pub mod error;
pub mod runner;
pub mod supervisor;
pub mod time_sync;
pub mod timer;
pub mod wallclock;

#[cfg(test)]
mod testing;

pub use config::{Credentials, LinkMode, TimeConfig};
pub use connection::ConnectionState;
pub use error::SupervisorError;
pub use runner::Runner;
pub use supervisor::{Supervisor, SupervisorSnapshot};
pub use wallclock::WallClock;

#[cfg(feature = "embassy-time")]
pub use runner::EmbassyTicker;
#[cfg(any(test, feature = "std"))]
pub use runner::{spawn, StdTicker};
