//! Wireless link driver abstraction
//!
//! The supervisor never talks to a radio directly. Boards wrap their WiFi
//! stack (esp-radio, cyw43, ESP-IDF, ...) in a type implementing
//! [`LinkDriver`].

use core::net::Ipv4Addr;

/// Association status reported by the radio driver
///
/// Numeric codes follow the values most WiFi stacks expose, so a driver can
/// usually forward its raw status through [`LinkStatus::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    /// No radio present
    NoShield,
    /// Radio stopped
    Stopped,
    /// Radio idle, no association in progress
    Idle,
    /// Configured network not found during scan
    NoSsidAvailable,
    /// Scan finished
    ScanCompleted,
    /// Associated and configured
    Connected,
    /// Association attempt failed
    ConnectFailed,
    /// Association lost
    ConnectionLost,
    /// Not associated
    Disconnected,
    /// Code the driver could not map
    Unknown(u8),
}

impl LinkStatus {
    /// Map a raw driver status code
    pub fn from_code(code: u8) -> Self {
        match code {
            255 => Self::NoShield,
            254 => Self::Stopped,
            0 => Self::Idle,
            1 => Self::NoSsidAvailable,
            2 => Self::ScanCompleted,
            3 => Self::Connected,
            4 => Self::ConnectFailed,
            5 => Self::ConnectionLost,
            6 => Self::Disconnected,
            other => Self::Unknown(other),
        }
    }

    /// Raw driver status code
    pub fn code(self) -> u8 {
        match self {
            Self::NoShield => 255,
            Self::Stopped => 254,
            Self::Idle => 0,
            Self::NoSsidAvailable => 1,
            Self::ScanCompleted => 2,
            Self::Connected => 3,
            Self::ConnectFailed => 4,
            Self::ConnectionLost => 5,
            Self::Disconnected => 6,
            Self::Unknown(code) => code,
        }
    }

    /// Short name used in log lines
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoShield => "NO_SHIELD",
            Self::Stopped => "STOPPED",
            Self::Idle => "IDLE",
            Self::NoSsidAvailable => "NO_SSID_AVAIL",
            Self::ScanCompleted => "SCAN_COMPLETED",
            Self::Connected => "CONNECTED",
            Self::ConnectFailed => "CONNECT_FAILED",
            Self::ConnectionLost => "CONNECTION_LOST",
            Self::Disconnected => "DISCONNECTED",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl core::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Radio power saving policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerSaveMode {
    /// Radio always on
    None,
    /// Wake on every DTIM beacon
    #[default]
    MinModem,
    /// Wake on the listen interval
    MaxModem,
}

/// Static addressing for station mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIpConfig {
    /// Address assigned to the station interface
    pub local_ip: Ipv4Addr,
    /// Default gateway
    pub gateway: Ipv4Addr,
    /// Network mask
    pub subnet: Ipv4Addr,
    /// Primary DNS server, `None` keeps the driver default
    pub dns1: Option<Ipv4Addr>,
    /// Secondary DNS server
    pub dns2: Option<Ipv4Addr>,
}

impl Default for StaticIpConfig {
    fn default() -> Self {
        Self {
            local_ip: Ipv4Addr::UNSPECIFIED,
            gateway: Ipv4Addr::UNSPECIFIED,
            subnet: Ipv4Addr::new(255, 255, 255, 0),
            dns1: None,
            dns2: None,
        }
    }
}

/// Addressing of the soft access point interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPointIpConfig {
    /// Address of the access point
    pub local_ip: Ipv4Addr,
    /// Gateway announced to clients
    pub gateway: Ipv4Addr,
    /// Network mask
    pub subnet: Ipv4Addr,
}

impl Default for AccessPointIpConfig {
    fn default() -> Self {
        Self {
            local_ip: Ipv4Addr::new(192, 168, 4, 1),
            gateway: Ipv4Addr::new(192, 168, 4, 1),
            subnet: Ipv4Addr::new(255, 255, 255, 0),
        }
    }
}

/// Driver operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// The driver refused the requested configuration
    Rejected,
    /// The operation is not available on this radio
    NotSupported,
    /// Radio hardware or firmware error
    HardwareError,
}

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Rejected => write!(f, "Configuration rejected"),
            Self::NotSupported => write!(f, "Operation not supported"),
            Self::HardwareError => write!(f, "Radio hardware error"),
        }
    }
}

impl core::error::Error for DriverError {}

/// Radio driver consumed by the supervisor
///
/// Association calls are fire-and-forget: the supervisor learns the outcome by
/// polling [`LinkDriver::is_connected`] on its next tick.
pub trait LinkDriver {
    /// Drop any current association
    fn disconnect(&mut self);

    /// Start joining `ssid` as a station
    fn connect_station(&mut self, ssid: &str, password: &str);

    /// Start broadcasting `ssid`, open when `password` is `None`
    fn start_access_point(&mut self, ssid: &str, password: Option<&str>);

    /// Associated and holding an address
    fn is_connected(&self) -> bool;

    /// Current association status
    fn status(&self) -> LinkStatus;

    /// Station interface address
    fn local_ip(&self) -> Ipv4Addr;

    /// Access point interface address
    fn soft_ap_ip(&self) -> Ipv4Addr;

    fn set_hostname(&mut self, hostname: &str);

    fn set_power_save_mode(&mut self, mode: PowerSaveMode) -> Result<(), DriverError>;

    fn set_station_ip_config(&mut self, config: &StaticIpConfig) -> Result<(), DriverError>;

    fn set_access_point_ip_config(
        &mut self,
        config: &AccessPointIpConfig,
    ) -> Result<(), DriverError>;
}
