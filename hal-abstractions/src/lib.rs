//! Hardware abstraction traits for the wireless link supervisor
//!
//! This crate defines the services the supervisor consumes but does not
//! implement: the radio driver, the wall clock and a monotonic timer.
//! Board support crates implement these traits.

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod clock;
pub mod link;
pub mod system;

pub use clock::{ClockService, LocalTime};
pub use link::{
    AccessPointIpConfig, DriverError, LinkDriver, LinkStatus, PowerSaveMode, StaticIpConfig,
};
pub use system::{Monotonic, SystemControl, Ticker};
