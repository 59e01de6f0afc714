//! Application facing supervisor
//!
//! ## Architecture
//! - The link driver, the clock service, the state machine and the time step
//!   live behind one blocking mutex; each call or tick holds it for a single
//!   operation, so state transitions never interleave
//! - Driver calls run with that mutex held. The raw mutex `M` is chosen by
//!   the board: `CriticalSectionRawMutex` when the runner and the application
//!   live on different priorities or threads, `ThreadModeRawMutex` or
//!   `NoopRawMutex` when a radio driver needs interrupts or other critical
//!   sections while it works
//! - The running flag and the time flags are atomics, readable from any
//!   context without the lock
//! - The periodic loop is a [`Runner`] borrowing the supervisor, handed out
//!   by [`Supervisor::begin`] in station mode
//!
//! ## Usage
//! ```ignore
//! static SUPERVISOR: StaticCell<Supervisor<ThreadModeRawMutex, Radio, Sntp>> =
//!     StaticCell::new();
//! let supervisor = SUPERVISOR.init(Supervisor::new(radio, sntp));
//! if let Some(runner) = supervisor.begin(LinkMode::Station, "home", "secret")? {
//!     spawner.spawn(supervisor_task(runner))?;
//! }
//! ```
//!
//! Closures given to [`Supervisor::with_link`] and [`Supervisor::with_clock`]
//! run under the lock and must not call back into the supervisor.

use core::cell::RefCell;
use core::net::Ipv4Addr;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use hal_abstractions::clock::FORMATTED_TIME_LEN;
use hal_abstractions::{
    AccessPointIpConfig, ClockService, LinkDriver, LinkStatus, LocalTime, PowerSaveMode,
    StaticIpConfig, SystemControl, Ticker,
};
use heapless::String;

use crate::config::{Credentials, LinkMode, TimeConfig, REBOOT_DELAY_MS, TIME_SENTINEL};
use crate::connection::{ConnectionMachine, ConnectionState};
use crate::error::SupervisorError;
use crate::runner::Runner;
use crate::time_sync::{TimeAcquisition, TimeFlags};

/// State shared between the application and the runner
struct Inner<L, C> {
    link: L,
    clock: C,
    connection: ConnectionMachine,
    time: TimeAcquisition,
}

/// Point-in-time view of the supervisor for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SupervisorSnapshot {
    pub state: ConnectionState,
    pub attempt: u32,
    pub retry_remaining_ms: u32,
    pub connect_requests: u32,
    pub escalations: u32,
    pub running: bool,
    pub time_enabled: bool,
    pub time_available: bool,
    pub time_sync_attempts: u32,
}

/// Wireless link and time supervisor
pub struct Supervisor<M, L, C> {
    inner: Mutex<M, RefCell<Inner<L, C>>>,
    running: AtomicBool,
    driver_active: AtomicBool,
    time: TimeFlags,
}

impl<M: RawMutex, L, C> Supervisor<M, L, C> {
    pub const fn new(link: L, clock: C) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                link,
                clock,
                connection: ConnectionMachine::new(),
                time: TimeAcquisition::new(),
            })),
            running: AtomicBool::new(false),
            driver_active: AtomicBool::new(false),
            time: TimeFlags::new(),
        }
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner<L, C>) -> R) -> R {
        self.inner.lock(|cell| f(&mut *cell.borrow_mut()))
    }
}

impl<M, L, C> Supervisor<M, L, C> {
    /// Supervision requested and not stopped
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Trusted wall clock time has been acquired
    pub fn is_time_available(&self) -> bool {
        self.time.is_available()
    }

    pub(crate) fn runner_finished(&self) {
        self.driver_active.store(false, Ordering::Release);
    }
}

impl<M: RawMutex, L: LinkDriver, C: ClockService> Supervisor<M, L, C> {
    /// Static addressing for station mode
    pub fn configure_station_ip(&self, config: &StaticIpConfig) -> Result<(), SupervisorError> {
        self.with_inner(|inner| inner.link.set_station_ip_config(config))
            .inspect_err(|e| warn!("Station IP configuration failed: {}", e))?;
        Ok(())
    }

    /// Addressing of the soft access point
    pub fn configure_access_point_ip(
        &self,
        config: &AccessPointIpConfig,
    ) -> Result<(), SupervisorError> {
        self.with_inner(|inner| inner.link.set_access_point_ip_config(config))
            .inspect_err(|e| warn!("Access point IP configuration failed: {}", e))?;
        Ok(())
    }

    /// Start supervising the link
    ///
    /// Validates and stores the credentials and issues the first connect
    /// request. In station mode the returned [`Runner`] must be driven for
    /// reconnection and time acquisition to happen. Access point mode needs
    /// no runner.
    pub fn begin(
        &self,
        mode: LinkMode,
        ssid: &str,
        password: &str,
    ) -> Result<Option<Runner<'_, M, L, C>>, SupervisorError> {
        let credentials = Credentials::new(mode, ssid, password)?;

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SupervisorError::AlreadyRunning);
        }

        if self.driver_active.load(Ordering::Acquire) {
            self.running.store(false, Ordering::Release);
            return Err(SupervisorError::RunnerActive);
        }

        info!("Supervisor starting in {} mode", mode);
        self.with_inner(|inner| inner.connection.begin(credentials, &mut inner.link));

        match mode {
            LinkMode::Station => {
                self.driver_active.store(true, Ordering::Release);
                Ok(Some(Runner::new(self)))
            }
            LinkMode::AccessPoint => Ok(None),
        }
    }

    /// Acquire wall clock time once the link is up
    pub fn enable_time_management(&self, config: TimeConfig) {
        info!(
            "Time management enabled, primary server {}",
            config.server1()
        );
        self.with_inner(|inner| inner.time.configure(config));
        self.time.enable();
    }

    pub fn set_hostname(&self, hostname: &str) {
        self.with_inner(|inner| inner.link.set_hostname(hostname));
    }

    pub fn set_power_save_mode(&self, mode: PowerSaveMode) -> Result<(), SupervisorError> {
        self.with_inner(|inner| inner.link.set_power_save_mode(mode))?;
        Ok(())
    }

    /// Stop supervising and drop the association
    ///
    /// The runner exits at the start of its next cycle.
    pub fn disconnect(&self) {
        self.running.store(false, Ordering::Release);
        self.with_inner(|inner| inner.connection.request_stop(&mut inner.link));
    }

    /// Driver reports a connection and the state machine agrees
    pub fn is_connected(&self) -> bool {
        self.with_inner(|inner| {
            inner.link.is_connected() && inner.connection.state() == ConnectionState::Connected
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.with_inner(|inner| inner.connection.state())
    }

    /// Raw driver status
    pub fn status(&self) -> LinkStatus {
        self.with_inner(|inner| inner.link.status())
    }

    /// Station interface address
    pub fn local_ip(&self) -> Ipv4Addr {
        self.with_inner(|inner| inner.link.local_ip())
    }

    /// Current local time
    pub fn time_info(&self) -> Result<LocalTime, SupervisorError> {
        if !self.time.is_available() {
            return Err(SupervisorError::TimeUnavailable);
        }

        self.with_inner(|inner| inner.clock.local_time())
            .ok_or_else(|| {
                error!("Failed to obtain time");
                SupervisorError::TimeUnavailable
            })
    }

    /// Current local time rendered with a strftime-style `format`
    ///
    /// Returns [`TIME_SENTINEL`] while time is unavailable or when the clock
    /// query or the formatting fails.
    pub fn time_formatted(&self, format: &str) -> String<FORMATTED_TIME_LEN> {
        let Ok(time) = self.time_info() else {
            return sentinel();
        };

        match self.with_inner(|inner| inner.clock.format_time(&time, format)) {
            Some(text) => text,
            None => {
                error!("Failed to format time");
                sentinel()
            }
        }
    }

    /// Disconnect, pause, then restart the device
    pub async fn reboot<S: SystemControl, T: Ticker>(&self, system: &mut S, ticker: &mut T) {
        warn!("Rebooting device");
        self.disconnect();
        ticker.delay_ms(REBOOT_DELAY_MS).await;
        system.restart();
    }

    /// One supervision cycle: connection step, then time step
    pub fn tick(&self, elapsed_ms: u32) {
        self.with_inner(|inner| {
            let running = self.is_running();
            inner
                .connection
                .tick(&mut inner.link, running, elapsed_ms);

            let link_up = inner.link.is_connected()
                && inner.connection.state() == ConnectionState::Connected;
            inner
                .time
                .tick(&mut inner.clock, &self.time, link_up, elapsed_ms);
        });
    }

    pub fn snapshot(&self) -> SupervisorSnapshot {
        self.with_inner(|inner| {
            let retry = inner.connection.retry();
            SupervisorSnapshot {
                state: inner.connection.state(),
                attempt: retry.attempt(),
                retry_remaining_ms: retry.remaining_ms(),
                connect_requests: inner.connection.connect_requests(),
                escalations: inner.connection.escalations(),
                running: self.is_running(),
                time_enabled: self.time.is_enabled(),
                time_available: self.time.is_available(),
                time_sync_attempts: inner.time.sync_attempts(),
            }
        })
    }

    /// Run `f` on the link driver under the supervisor lock
    pub fn with_link<R>(&self, f: impl FnOnce(&mut L) -> R) -> R {
        self.with_inner(|inner| f(&mut inner.link))
    }

    /// Run `f` on the clock service under the supervisor lock
    pub fn with_clock<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        self.with_inner(|inner| f(&mut inner.clock))
    }
}

fn sentinel() -> String<FORMATTED_TIME_LEN> {
    let mut text = String::new();
    // TIME_SENTINEL fits any formatted time buffer
    let _ = text.push_str(TIME_SENTINEL);
    text
}
