//! Wall clock abstraction
//!
//! ## Architecture
//! - [`ClockService`] is the external time source (SNTP client, RTC, OS clock)
//! - [`LocalTime`] is the broken-down local time it reports
//! - `calendar` holds the O(1) date math, `format` the strftime subset
//!
//! ## Limitations
//! - No leap seconds
//! - Time zone handling is a fixed GMT offset plus a fixed DST offset

mod calendar;
mod format;

use heapless::String;

pub use calendar::{civil_from_days, days_from_civil, is_leap_year, weekday_from_days};
pub use format::format_into;

/// Capacity of formatted time strings
pub const FORMATTED_TIME_LEN: usize = 64;

/// Broken-down local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalTime {
    /// Full year, e.g. 2024
    pub year: i32,
    /// Month of year (1-12)
    pub month: u8,
    /// Day of month (1-31)
    pub day: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
    /// Day of week (0-6, Sunday = 0)
    pub weekday: u8,
    /// Day of year (0-365)
    pub year_day: u16,
    /// Daylight saving time in effect
    pub is_dst: bool,
}

impl LocalTime {
    /// Break down a Unix timestamp shifted by `offset_secs`
    pub fn from_unix(unix_secs: i64, offset_secs: i32) -> Self {
        const SECONDS_PER_DAY: i64 = 86_400;

        let local = unix_secs.saturating_add(i64::from(offset_secs));
        let days = local.div_euclid(SECONDS_PER_DAY);
        let secs_today = local.rem_euclid(SECONDS_PER_DAY);

        let (year, month, day) = civil_from_days(days);
        let year_day = (days - days_from_civil(year, 1, 1)) as u16;

        Self {
            year,
            month,
            day,
            hour: (secs_today / 3600) as u8,
            minute: ((secs_today % 3600) / 60) as u8,
            second: (secs_today % 60) as u8,
            weekday: weekday_from_days(days),
            year_day,
            is_dst: false,
        }
    }

    /// Seconds since the Unix epoch, undoing `offset_secs`
    pub fn to_unix(&self, offset_secs: i32) -> i64 {
        let days = days_from_civil(self.year, self.month, self.day);
        days * 86_400
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64
            - offset_secs as i64
    }

    /// Hour on a 12-hour clock (1-12)
    pub fn hour12(&self) -> u8 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }

    /// Render with a strftime-style `format`
    ///
    /// Returns `None` when the output is empty or does not fit.
    pub fn format(&self, format: &str) -> Option<String<FORMATTED_TIME_LEN>> {
        let mut out = String::new();
        format_into(self, format, &mut out).ok()?;
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

/// External wall clock consumed by the supervisor
pub trait ClockService {
    /// Start synchronizing with up to three time servers
    ///
    /// `gmt_offset_secs` and `dst_offset_secs` are applied to every local time
    /// reported afterwards.
    fn configure_time(
        &mut self,
        gmt_offset_secs: i32,
        dst_offset_secs: i32,
        server1: &str,
        server2: Option<&str>,
        server3: Option<&str>,
    );

    /// Current local time, `None` while the clock is not trusted
    fn local_time(&self) -> Option<LocalTime>;

    /// Render `time` with a strftime-style `format`
    fn format_time(&self, time: &LocalTime, format: &str) -> Option<String<FORMATTED_TIME_LEN>> {
        time.format(format)
    }
}
