//! In-memory drivers for unit tests

use core::net::Ipv4Addr;

use hal_abstractions::{
    AccessPointIpConfig, ClockService, DriverError, LinkDriver, LinkStatus, LocalTime,
    PowerSaveMode, StaticIpConfig,
};
use heapless::String;

/// Radio that records every request and reports whatever the test sets
#[derive(Debug)]
pub struct FakeLink {
    pub connected: bool,
    pub idle_status: LinkStatus,
    pub station_connects: u32,
    pub ap_starts: u32,
    pub disconnects: u32,
    pub ap_open: Option<bool>,
    pub hostname: String<32>,
    pub power_save: Option<PowerSaveMode>,
    pub station_ip: Option<StaticIpConfig>,
    pub ap_ip: Option<AccessPointIpConfig>,
    pub reject_config: bool,
    /// Hand each station connect to a worker thread that enters a critical
    /// section, and wait for it
    pub worker_handoff: bool,
}

impl FakeLink {
    pub fn new() -> Self {
        Self {
            connected: false,
            idle_status: LinkStatus::Disconnected,
            station_connects: 0,
            ap_starts: 0,
            disconnects: 0,
            ap_open: None,
            hostname: String::new(),
            power_save: None,
            station_ip: None,
            ap_ip: None,
            reject_config: false,
            worker_handoff: false,
        }
    }

    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::new()
        }
    }

    fn config_result(&self) -> Result<(), DriverError> {
        if self.reject_config {
            Err(DriverError::Rejected)
        } else {
            Ok(())
        }
    }
}

impl LinkDriver for FakeLink {
    fn disconnect(&mut self) {
        self.disconnects += 1;
    }

    fn connect_station(&mut self, _ssid: &str, _password: &str) {
        if self.worker_handoff {
            std::thread::scope(|scope| {
                scope.spawn(|| critical_section::with(|_| ())).join().unwrap();
            });
        }
        self.station_connects += 1;
    }

    fn start_access_point(&mut self, _ssid: &str, password: Option<&str>) {
        self.ap_starts += 1;
        self.ap_open = Some(password.is_none());
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn status(&self) -> LinkStatus {
        if self.connected {
            LinkStatus::Connected
        } else {
            self.idle_status
        }
    }

    fn local_ip(&self) -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 1, 50)
    }

    fn soft_ap_ip(&self) -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 4, 1)
    }

    fn set_hostname(&mut self, hostname: &str) {
        self.hostname.clear();
        let _ = self.hostname.push_str(hostname);
    }

    fn set_power_save_mode(&mut self, mode: PowerSaveMode) -> Result<(), DriverError> {
        self.config_result()?;
        self.power_save = Some(mode);
        Ok(())
    }

    fn set_station_ip_config(&mut self, config: &StaticIpConfig) -> Result<(), DriverError> {
        self.config_result()?;
        self.station_ip = Some(*config);
        Ok(())
    }

    fn set_access_point_ip_config(
        &mut self,
        config: &AccessPointIpConfig,
    ) -> Result<(), DriverError> {
        self.config_result()?;
        self.ap_ip = Some(*config);
        Ok(())
    }
}

/// Clock that answers with a fixed time once `time` is set
#[derive(Debug, Default)]
pub struct FakeClock {
    pub time: Option<LocalTime>,
    pub configure_calls: u32,
    pub offsets: (i32, i32),
    pub server1: String<64>,
    pub server2: Option<String<64>>,
    pub server3: Option<String<64>>,
}

impl FakeClock {
    pub fn synced(unix_secs: i64) -> Self {
        Self {
            time: Some(LocalTime::from_unix(unix_secs, 0)),
            ..Self::default()
        }
    }
}

fn copy_name(name: &str) -> String<64> {
    let mut out = String::new();
    let _ = out.push_str(name);
    out
}

impl ClockService for FakeClock {
    fn configure_time(
        &mut self,
        gmt_offset_secs: i32,
        dst_offset_secs: i32,
        server1: &str,
        server2: Option<&str>,
        server3: Option<&str>,
    ) {
        self.configure_calls += 1;
        self.offsets = (gmt_offset_secs, dst_offset_secs);
        self.server1 = copy_name(server1);
        self.server2 = server2.map(copy_name);
        self.server3 = server3.map(copy_name);
    }

    fn local_time(&self) -> Option<LocalTime> {
        self.time
    }
}
