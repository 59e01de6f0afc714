//! End-to-end behavior through the public API

use core::cell::Cell;
use core::net::Ipv4Addr;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use hal_abstractions::{
    AccessPointIpConfig, ClockService, DriverError, LinkDriver, LinkStatus, LocalTime, Monotonic,
    PowerSaveMode, StaticIpConfig, Ticker,
};
use wifi_supervisor::config::{RETRY_INTERVAL_MS, TIME_SENTINEL};
use wifi_supervisor::{ConnectionState, LinkMode, Supervisor, TimeConfig};

#[derive(Default)]
struct Radio {
    connected: bool,
    station_connects: u32,
    ap_starts: u32,
    disconnects: u32,
}

impl LinkDriver for Radio {
    fn disconnect(&mut self) {
        self.disconnects += 1;
    }

    fn connect_station(&mut self, _ssid: &str, _password: &str) {
        self.station_connects += 1;
    }

    fn start_access_point(&mut self, _ssid: &str, _password: Option<&str>) {
        self.ap_starts += 1;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn status(&self) -> LinkStatus {
        if self.connected {
            LinkStatus::Connected
        } else {
            LinkStatus::NoSsidAvailable
        }
    }

    fn local_ip(&self) -> Ipv4Addr {
        Ipv4Addr::new(10, 1, 2, 3)
    }

    fn soft_ap_ip(&self) -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 4, 1)
    }

    fn set_hostname(&mut self, _hostname: &str) {}

    fn set_power_save_mode(&mut self, _mode: PowerSaveMode) -> Result<(), DriverError> {
        Ok(())
    }

    fn set_station_ip_config(&mut self, _config: &StaticIpConfig) -> Result<(), DriverError> {
        Ok(())
    }

    fn set_access_point_ip_config(
        &mut self,
        _config: &AccessPointIpConfig,
    ) -> Result<(), DriverError> {
        Ok(())
    }
}

#[derive(Default)]
struct Clock {
    answers: bool,
    configured: u32,
}

impl ClockService for Clock {
    fn configure_time(
        &mut self,
        _gmt_offset_secs: i32,
        _dst_offset_secs: i32,
        _server1: &str,
        _server2: Option<&str>,
        _server3: Option<&str>,
    ) {
        self.configured += 1;
    }

    fn local_time(&self) -> Option<LocalTime> {
        self.answers
            .then(|| LocalTime::from_unix(1_709_993_107, 0))
    }
}

type Device = Supervisor<CriticalSectionRawMutex, Radio, Clock>;

fn device(connected: bool) -> Device {
    Supervisor::new(
        Radio {
            connected,
            ..Radio::default()
        },
        Clock {
            answers: true,
            ..Clock::default()
        },
    )
}

/// Simulated time that stops the supervisor once `limit_ms` has passed
struct SimTicker<'a> {
    now: Cell<u64>,
    limit_ms: u64,
    device: &'a Device,
}

impl Monotonic for SimTicker<'_> {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

impl Ticker for SimTicker<'_> {
    async fn delay_ms(&mut self, ms: u32) {
        self.now.set(self.now.get() + u64::from(ms));
        if self.now.get() > self.limit_ms {
            self.device.disconnect();
        }
    }
}

#[test]
fn never_connected_station_escalates_once() {
    let device = device(false);
    let runner = device
        .begin(LinkMode::Station, "home", "secret")
        .unwrap()
        .unwrap();

    // Cycles run at 0, 500, ... 10000 ms, then the ticker stops the device
    let ticker = SimTicker {
        now: Cell::new(0),
        limit_ms: 10_000,
        device: &device,
    };
    embassy_futures::block_on(runner.run(ticker));

    let snapshot = device.snapshot();
    assert_eq!(snapshot.escalations, 1);
    assert_eq!(snapshot.connect_requests, 2);
    assert_eq!(device.with_link(|radio| radio.station_connects), 2);
    assert_eq!(snapshot.state, ConnectionState::DisconnectedRequested);
}

#[test]
fn attempt_counts_up_to_eleven_in_ten_seconds() {
    let device = device(false);
    let _runner = device.begin(LinkMode::Station, "home", "secret").unwrap();

    device.tick(0);
    for _ in 0..20 {
        device.tick(500);
    }

    let snapshot = device.snapshot();
    assert_eq!(snapshot.attempt, 11);
    assert_eq!(snapshot.escalations, 1);
    assert_eq!(snapshot.state, ConnectionState::Connecting);
}

#[test]
fn connected_on_first_tick() {
    let device = device(true);
    let _runner = device.begin(LinkMode::Station, "home", "secret").unwrap();
    device.tick(0);

    let snapshot = device.snapshot();
    assert_eq!(snapshot.state, ConnectionState::Connected);
    assert_eq!(snapshot.attempt, 1);
    assert_eq!(snapshot.retry_remaining_ms, RETRY_INTERVAL_MS);
    assert!(device.is_connected());
}

#[test]
fn attempt_never_drops_below_one() {
    let device = device(false);
    let _runner = device.begin(LinkMode::Station, "home", "secret").unwrap();
    for step in 0..200u32 {
        device.with_link(|radio| radio.connected = step % 7 == 0);
        device.tick(step % 3 * 400);
        assert!(device.snapshot().attempt >= 1);
    }
}

#[test]
fn time_survives_link_loss() {
    let device = device(true);
    device.enable_time_management(TimeConfig::new(0, 0, &["pool.ntp.org"]).unwrap());
    let _runner = device.begin(LinkMode::Station, "home", "secret").unwrap();

    device.tick(0);
    assert!(!device.is_time_available());
    device.tick(1000);
    assert!(device.is_time_available());
    assert_eq!(device.with_clock(|clock| clock.configured), 1);

    device.with_link(|radio| radio.connected = false);
    for _ in 0..10 {
        device.tick(500);
    }
    assert!(device.is_time_available());
    assert_eq!(device.state(), ConnectionState::Connecting);
    assert_eq!(device.time_formatted("%H:%M").as_str(), "14:05");
}

#[test]
fn time_sentinel_for_any_format_until_available() {
    let device = device(true);
    device.enable_time_management(TimeConfig::default());
    let _runner = device.begin(LinkMode::Station, "home", "secret").unwrap();
    device.with_clock(|clock| clock.answers = false);

    device.tick(0);
    device.tick(1000);
    device.tick(1000);
    assert!(!device.is_time_available());
    for format in ["%A", "%d/%m/%Y", "%%", ""] {
        assert_eq!(device.time_formatted(format).as_str(), TIME_SENTINEL);
    }
}

#[test]
fn access_point_ignores_ticks() {
    let device = device(false);
    let runner = device.begin(LinkMode::AccessPoint, "setup", "").unwrap();
    assert!(runner.is_none());
    let disconnects = device.with_link(|radio| radio.disconnects);

    for step in 0..50 {
        device.with_link(|radio| radio.connected = step % 3 != 0);
        device.tick(RETRY_INTERVAL_MS);
    }
    assert_eq!(device.state(), ConnectionState::SoftAp);
    assert_eq!(device.with_link(|radio| radio.ap_starts), 1);
    assert_eq!(device.with_link(|radio| radio.station_connects), 0);
    assert_eq!(device.with_link(|radio| radio.disconnects), disconnects);
}

#[test]
fn stop_while_connecting_halts_requests() {
    let device = device(false);
    let _runner = device.begin(LinkMode::Station, "home", "secret").unwrap();
    device.tick(0);
    assert_eq!(device.state(), ConnectionState::Connecting);

    device.disconnect();
    device.disconnect();
    for _ in 0..30 {
        device.tick(RETRY_INTERVAL_MS);
    }

    assert_eq!(device.state(), ConnectionState::DisconnectedRequested);
    assert_eq!(device.with_link(|radio| radio.station_connects), 1);
    assert!(!device.is_running());
}
