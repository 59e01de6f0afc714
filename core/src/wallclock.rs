//! Monotonic-backed wall clock
//!
//! A [`ClockService`] for targets without an OS clock. `configure_time`
//! records which servers to ask and the local offsets; whatever owns the
//! network stack (an SNTP task, typically) polls [`WallClock::pending_sync`],
//! queries a server and feeds the answer back through
//! [`WallClock::calibrate`] or [`WallClock::calibrate_ntp`]. Local time is
//! then derived from the monotonic clock elapsed since calibration.

use hal_abstractions::{ClockService, LocalTime, Monotonic};
use heapless::String;

use crate::config::SERVER_NAME_MAX_LEN;

/// NTP epoch offset (1900-01-01 to 1970-01-01 in seconds)
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// Servers requested by the last `configure_time`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    servers: [Option<String<SERVER_NAME_MAX_LEN>>; 3],
}

impl SyncRequest {
    /// Configured servers in priority order
    pub fn servers(&self) -> impl Iterator<Item = &str> {
        self.servers.iter().flatten().map(|name| name.as_str())
    }
}

/// Calibration point: Unix seconds at a monotonic instant
#[derive(Debug, Clone, Copy)]
struct Anchor {
    unix_secs: i64,
    mono_ms: u64,
}

pub struct WallClock<M> {
    monotonic: M,
    gmt_offset_secs: i32,
    dst_offset_secs: i32,
    request: Option<SyncRequest>,
    sync_pending: bool,
    anchor: Option<Anchor>,
}

impl<M: Monotonic> WallClock<M> {
    pub const fn new(monotonic: M) -> Self {
        Self {
            monotonic,
            gmt_offset_secs: 0,
            dst_offset_secs: 0,
            request: None,
            sync_pending: false,
            anchor: None,
        }
    }

    /// Sync request awaiting a server answer
    pub fn pending_sync(&self) -> Option<&SyncRequest> {
        self.request.as_ref().filter(|_| self.sync_pending)
    }

    /// Anchor wall time at `unix_secs` as of now
    pub fn calibrate(&mut self, unix_secs: i64) {
        self.anchor = Some(Anchor {
            unix_secs,
            mono_ms: self.monotonic.now_ms(),
        });
        self.sync_pending = false;
        info!("Wall clock calibrated to {}", unix_secs);
    }

    /// Anchor wall time from an NTP timestamp (seconds since 1900)
    pub fn calibrate_ntp(&mut self, ntp_secs: u64) {
        let unix_secs = ntp_secs.saturating_sub(NTP_UNIX_OFFSET);
        self.calibrate(i64::try_from(unix_secs).unwrap_or(i64::MAX));
    }

    pub fn is_calibrated(&self) -> bool {
        self.anchor.is_some()
    }

    /// Current Unix time, `None` until calibrated
    pub fn now_unix(&self) -> Option<i64> {
        let anchor = self.anchor?;
        let elapsed_ms = self.monotonic.now_ms().saturating_sub(anchor.mono_ms);
        let elapsed_secs = i64::try_from(elapsed_ms / 1000).unwrap_or(i64::MAX);
        Some(anchor.unix_secs.saturating_add(elapsed_secs))
    }
}

fn server_name(name: &str) -> String<SERVER_NAME_MAX_LEN> {
    let mut stored = String::new();
    if stored.push_str(name).is_err() {
        warn!("Time server name too long, ignored: {}", name);
        stored.clear();
    }
    stored
}

impl<M: Monotonic> ClockService for WallClock<M> {
    fn configure_time(
        &mut self,
        gmt_offset_secs: i32,
        dst_offset_secs: i32,
        server1: &str,
        server2: Option<&str>,
        server3: Option<&str>,
    ) {
        self.gmt_offset_secs = gmt_offset_secs;
        self.dst_offset_secs = dst_offset_secs;

        let servers = [Some(server1), server2, server3]
            .map(|name| name.map(server_name).filter(|name| !name.is_empty()));
        self.request = Some(SyncRequest { servers });
        self.sync_pending = true;
    }

    fn local_time(&self) -> Option<LocalTime> {
        let unix_secs = self.now_unix()?;
        let offset = self.gmt_offset_secs.saturating_add(self.dst_offset_secs);
        let mut time = LocalTime::from_unix(unix_secs, offset);
        time.is_dst = self.dst_offset_secs != 0;
        Some(time)
    }
}
