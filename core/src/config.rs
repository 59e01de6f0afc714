//! Supervisor configuration structures and timing constants

use heapless::String;

use crate::error::SupervisorError;

/// Retry decision interval while the link is down
pub const RETRY_INTERVAL_MS: u32 = 1000;

/// Time acquisition retry interval while the link is up
pub const TIME_SYNC_INTERVAL_MS: u32 = 1000;

/// Nominal period of the supervisor loop
pub const DRIVER_PERIOD_MS: u32 = 500;

/// Every this many failed attempts the association is restarted regardless
/// of state
pub const ESCALATION_EVERY: u32 = 10;

/// Pause between disconnecting and restarting the device
pub const REBOOT_DELAY_MS: u32 = 1000;

/// Time server used when none is configured
pub const DEFAULT_TIME_SERVER: &str = "pool.ntp.org";

/// Format of the log line written once time is acquired
pub const TIME_LOG_FORMAT: &str = "%A, %B %d %Y %H:%M:%S";

/// Returned by formatted time queries while time is unavailable
pub const TIME_SENTINEL: &str = "NN:NN:NN";

/// Maximum SSID length in bytes (802.11)
pub const SSID_MAX_LEN: usize = 32;

/// Maximum password length in bytes (63-char passphrase or 64 hex digits)
pub const PASSWORD_MAX_LEN: usize = 64;

/// Maximum time server name length in bytes
pub const SERVER_NAME_MAX_LEN: usize = 64;

/// Role of the device on the wireless network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkMode {
    /// Join an existing network as a client
    Station,
    /// Broadcast our own network
    AccessPoint,
}

impl core::fmt::Display for LinkMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Station => write!(f, "station"),
            Self::AccessPoint => write!(f, "access point"),
        }
    }
}

/// Network credentials, fixed for the lifetime of a `begin`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    mode: LinkMode,
    ssid: String<SSID_MAX_LEN>,
    password: String<PASSWORD_MAX_LEN>,
}

impl Credentials {
    /// Validate and copy credentials
    ///
    /// An empty `password` makes the access point open.
    pub fn new(mode: LinkMode, ssid: &str, password: &str) -> Result<Self, SupervisorError> {
        if ssid.is_empty() {
            return Err(SupervisorError::EmptySsid);
        }

        let mut stored_ssid = String::new();
        stored_ssid
            .push_str(ssid)
            .map_err(|_| SupervisorError::SsidTooLong)?;

        let mut stored_password = String::new();
        stored_password
            .push_str(password)
            .map_err(|_| SupervisorError::PasswordTooLong)?;

        Ok(Self {
            mode,
            ssid: stored_ssid,
            password: stored_password,
        })
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Time acquisition configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeConfig {
    /// Offset from GMT in seconds
    pub gmt_offset_secs: i32,
    /// Additional daylight saving offset in seconds
    pub dst_offset_secs: i32,
    server1: String<SERVER_NAME_MAX_LEN>,
    server2: Option<String<SERVER_NAME_MAX_LEN>>,
    server3: Option<String<SERVER_NAME_MAX_LEN>>,
}

impl TimeConfig {
    /// Build a configuration from up to three server names
    ///
    /// Positions are kept: an empty second name with a non-empty third still
    /// reports the third as `server3`. An empty or missing first name falls
    /// back to [`DEFAULT_TIME_SERVER`].
    pub fn new(
        gmt_offset_secs: i32,
        dst_offset_secs: i32,
        servers: &[&str],
    ) -> Result<Self, SupervisorError> {
        if servers.len() > 3 {
            return Err(SupervisorError::TooManyServers);
        }

        let primary = match servers.first() {
            Some(name) if !name.is_empty() => *name,
            _ => DEFAULT_TIME_SERVER,
        };

        Ok(Self {
            gmt_offset_secs,
            dst_offset_secs,
            server1: server_name(primary)?,
            server2: optional_server(servers.get(1).copied())?,
            server3: optional_server(servers.get(2).copied())?,
        })
    }

    pub fn server1(&self) -> &str {
        &self.server1
    }

    pub fn server2(&self) -> Option<&str> {
        self.server2.as_deref()
    }

    pub fn server3(&self) -> Option<&str> {
        self.server3.as_deref()
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        let mut server1 = String::new();
        // DEFAULT_TIME_SERVER is shorter than SERVER_NAME_MAX_LEN
        let _ = server1.push_str(DEFAULT_TIME_SERVER);
        Self {
            gmt_offset_secs: 0,
            dst_offset_secs: 0,
            server1,
            server2: None,
            server3: None,
        }
    }
}

fn server_name(name: &str) -> Result<String<SERVER_NAME_MAX_LEN>, SupervisorError> {
    let mut stored = String::new();
    stored
        .push_str(name)
        .map_err(|_| SupervisorError::ServerNameTooLong)?;
    Ok(stored)
}

fn optional_server(
    name: Option<&str>,
) -> Result<Option<String<SERVER_NAME_MAX_LEN>>, SupervisorError> {
    match name {
        Some(name) if !name.is_empty() => server_name(name).map(Some),
        _ => Ok(None),
    }
}
