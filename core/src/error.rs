//! Supervisor error types

use hal_abstractions::DriverError;

/// Supervisor operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SupervisorError {
    /// `begin` called while the supervisor is running
    AlreadyRunning,
    /// A runner from a previous `begin` has not exited yet
    RunnerActive,
    /// Network name is empty
    EmptySsid,
    /// Network name longer than 32 bytes
    SsidTooLong,
    /// Password longer than 64 bytes
    PasswordTooLong,
    /// More than three time servers given
    TooManyServers,
    /// Time server name longer than 64 bytes
    ServerNameTooLong,
    /// Time has not been acquired or the clock query failed
    TimeUnavailable,
    /// The link driver refused an operation
    Driver(DriverError),
}

impl From<DriverError> for SupervisorError {
    fn from(e: DriverError) -> Self {
        SupervisorError::Driver(e)
    }
}

impl core::fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "Supervisor already running"),
            Self::RunnerActive => write!(f, "Previous runner still active"),
            Self::EmptySsid => write!(f, "Empty SSID"),
            Self::SsidTooLong => write!(f, "SSID too long"),
            Self::PasswordTooLong => write!(f, "Password too long"),
            Self::TooManyServers => write!(f, "Too many time servers"),
            Self::ServerNameTooLong => write!(f, "Time server name too long"),
            Self::TimeUnavailable => write!(f, "Time unavailable"),
            Self::Driver(e) => write!(f, "Driver error: {}", e),
        }
    }
}

impl core::error::Error for SupervisorError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Driver(e) => Some(e),
            _ => None,
        }
    }
}
