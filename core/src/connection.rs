//! Link reconnection state machine
//!
//! ## Architecture
//! - [`ConnectionMachine::tick`] runs once per supervisor cycle with the time
//!   elapsed since the previous cycle
//! - A [`RetryCounter`] paces reconnection decisions to one per
//!   [`RETRY_INTERVAL_MS`] while the link is down
//! - Every [`ESCALATION_EVERY`]th failed attempt forces a fresh association
//!   even if one is already in progress
//!
//! ## State flow
//! ```text
//! Initial -> Connecting -> Connected -> DisconnectedLoss -> Connecting ...
//! any -> DisconnectedRequested (until the next begin)
//! access point mode -> SoftAp (terminal)
//! ```
//!
//! Only `Connecting` promotes to `Connected`. A link that comes back on its own
//! while in `DisconnectedLoss` resets the retry counter but keeps the state
//! until the next connect request moves it to `Connecting`.

use hal_abstractions::LinkDriver;

use crate::config::{Credentials, LinkMode, ESCALATION_EVERY, RETRY_INTERVAL_MS};
use crate::timer::IntervalTimer;

/// Logical link state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// Credentials stored, no association requested yet
    Initial,
    /// Station association in progress
    Connecting,
    /// Station associated
    Connected,
    /// Association lost, reconnecting
    DisconnectedLoss,
    /// Stopped by the application
    DisconnectedRequested,
    /// Broadcasting our own network
    SoftAp,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::DisconnectedLoss => "DISCONNECTED_LOSS",
            Self::DisconnectedRequested => "DISCONNECTED_REQUESTED",
            Self::SoftAp => "SOFT_AP",
        }
    }
}

impl core::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retry pacing and attempt count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryCounter {
    timer: IntervalTimer,
    attempt: u32,
}

impl RetryCounter {
    pub const fn new() -> Self {
        Self {
            timer: IntervalTimer::new(RETRY_INTERVAL_MS),
            attempt: 1,
        }
    }

    /// Attempt number of the next retry decision, never below 1
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Time left until the next retry decision
    pub fn remaining_ms(&self) -> u32 {
        self.timer.remaining_ms()
    }

    pub fn reset(&mut self) {
        self.timer.reset();
        self.attempt = 1;
    }

    fn poll(&mut self, elapsed_ms: u32) -> bool {
        self.timer.poll(elapsed_ms)
    }

    fn advance(&mut self) {
        self.attempt = self.attempt.saturating_add(1);
    }
}

impl Default for RetryCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconnection state machine
#[derive(Debug)]
pub struct ConnectionMachine {
    credentials: Option<Credentials>,
    state: ConnectionState,
    retry: RetryCounter,
    connect_requests: u32,
    escalations: u32,
}

impl ConnectionMachine {
    pub const fn new() -> Self {
        Self {
            credentials: None,
            state: ConnectionState::Initial,
            retry: RetryCounter::new(),
            connect_requests: 0,
            escalations: 0,
        }
    }

    /// Store `credentials` and issue the first connect request
    pub fn begin<L: LinkDriver>(&mut self, credentials: Credentials, link: &mut L) {
        self.credentials = Some(credentials);
        self.state = ConnectionState::Initial;
        self.retry.reset();
        self.connect_request(link);
    }

    /// One supervision step
    ///
    /// `running` is false once the application asked to stop; the machine
    /// then only keeps its counters reset.
    pub fn tick<L: LinkDriver>(&mut self, link: &mut L, running: bool, elapsed_ms: u32) {
        if self.credentials.is_none() || self.state == ConnectionState::SoftAp {
            return;
        }

        if !running || link.is_connected() {
            if self.state == ConnectionState::Connecting {
                let ip = link.local_ip().octets();
                info!(
                    "Link connected at attempt {}, IP: {}.{}.{}.{}",
                    self.retry.attempt(),
                    ip[0],
                    ip[1],
                    ip[2],
                    ip[3]
                );
                self.state = ConnectionState::Connected;
            }
            self.retry.reset();
            return;
        }

        if self.state == ConnectionState::Connected {
            let status = link.status();
            error!("Link lost, attempting reconnection");
            info!("Link status: {}({})", status.as_str(), status.code());
            self.state = ConnectionState::DisconnectedLoss;
        }

        if !self.retry.poll(elapsed_ms) {
            return;
        }

        if matches!(
            self.state,
            ConnectionState::DisconnectedLoss | ConnectionState::Initial
        ) {
            self.connect_request(link);
        }

        let attempt = self.retry.attempt();
        let status = link.status();
        info!(
            "Attempt number {}, link status: {}({})",
            attempt,
            status.as_str(),
            status.code()
        );

        if attempt % ESCALATION_EVERY == 0 {
            error!("No connection after {} attempts, restarting association", attempt);
            self.escalations = self.escalations.saturating_add(1);
            self.connect_request(link);
        }

        self.retry.advance();
    }

    /// Drop any association and start a new one per the stored mode
    pub fn connect_request<L: LinkDriver>(&mut self, link: &mut L) {
        let Some(credentials) = &self.credentials else {
            return;
        };

        link.disconnect();
        self.connect_requests = self.connect_requests.saturating_add(1);

        match credentials.mode() {
            LinkMode::AccessPoint => {
                let password = match credentials.password() {
                    "" => None,
                    password => Some(password),
                };
                link.start_access_point(credentials.ssid(), password);
                self.state = ConnectionState::SoftAp;

                let ip = link.soft_ap_ip().octets();
                info!(
                    "Access point started, AP IP: {}.{}.{}.{}",
                    ip[0], ip[1], ip[2], ip[3]
                );
            }
            LinkMode::Station => {
                info!("Station connection started");
                link.connect_station(credentials.ssid(), credentials.password());
                self.state = ConnectionState::Connecting;
            }
        }
    }

    /// Stop supervising until the next `begin`
    pub fn request_stop<L: LinkDriver>(&mut self, link: &mut L) {
        self.state = ConnectionState::DisconnectedRequested;
        self.retry.reset();
        link.disconnect();
        info!("Station disconnected as requested");
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn retry(&self) -> &RetryCounter {
        &self.retry
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Connect requests issued since creation
    pub fn connect_requests(&self) -> u32 {
        self.connect_requests
    }

    /// Forced reassociations since creation
    pub fn escalations(&self) -> u32 {
        self.escalations
    }
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new()
    }
}
