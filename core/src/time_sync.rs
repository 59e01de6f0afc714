//! Time acquisition gated on the link
//!
//! Once time management is enabled and the link is up, the clock service is
//! asked to synchronize every [`TIME_SYNC_INTERVAL_MS`] until it reports a
//! local time. From then on time is considered available for the rest of the
//! process lifetime, even across link loss.

use core::sync::atomic::{AtomicBool, Ordering};

use hal_abstractions::ClockService;

use crate::config::{TimeConfig, TIME_LOG_FORMAT, TIME_SYNC_INTERVAL_MS};
use crate::timer::IntervalTimer;

/// Flags read without taking the supervisor lock
#[derive(Debug)]
pub struct TimeFlags {
    enabled: AtomicBool,
    available: AtomicBool,
}

impl TimeFlags {
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            available: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Never cleared once set
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Never cleared once set
    pub fn mark_available(&self) {
        self.available.store(true, Ordering::Release);
    }
}

impl Default for TimeFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic synchronization request state
#[derive(Debug)]
pub struct TimeAcquisition {
    timer: IntervalTimer,
    config: Option<TimeConfig>,
    sync_attempts: u32,
}

impl TimeAcquisition {
    pub const fn new() -> Self {
        Self {
            timer: IntervalTimer::new(TIME_SYNC_INTERVAL_MS),
            config: None,
            sync_attempts: 0,
        }
    }

    /// Offsets and servers used by later sync requests
    pub fn configure(&mut self, config: TimeConfig) {
        self.config = Some(config);
    }

    pub fn config(&self) -> Option<&TimeConfig> {
        self.config.as_ref()
    }

    /// Sync requests issued so far
    pub fn sync_attempts(&self) -> u32 {
        self.sync_attempts
    }

    /// One acquisition step
    ///
    /// `link_up` must be true only when the driver reports a connection and
    /// the state machine agrees.
    pub fn tick<C: ClockService>(
        &mut self,
        clock: &mut C,
        flags: &TimeFlags,
        link_up: bool,
        elapsed_ms: u32,
    ) {
        if flags.is_available() || !flags.is_enabled() || !link_up {
            return;
        }

        if !self.timer.poll(elapsed_ms) {
            return;
        }

        let Some(config) = &self.config else {
            return;
        };

        self.sync_attempts = self.sync_attempts.saturating_add(1);
        clock.configure_time(
            config.gmt_offset_secs,
            config.dst_offset_secs,
            config.server1(),
            config.server2(),
            config.server3(),
        );

        match clock.local_time() {
            Some(time) => {
                if let Some(text) = clock.format_time(&time, TIME_LOG_FORMAT) {
                    info!("Time initialized at {}", text.as_str());
                }
                flags.mark_available();
            }
            None => error!("Failed to obtain time"),
        }
    }
}

impl Default for TimeAcquisition {
    fn default() -> Self {
        Self::new()
    }
}
