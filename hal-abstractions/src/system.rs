//! Timing and system control traits

use core::future::Future;

/// Millisecond monotonic clock
pub trait Monotonic {
    /// Milliseconds since an arbitrary fixed origin, never decreasing
    fn now_ms(&self) -> u64;
}

/// Monotonic clock that can also suspend the calling task
///
/// Implemented over `embassy_time::Timer` on bare metal and over
/// `std::thread::sleep` on hosted targets.
pub trait Ticker: Monotonic {
    /// Suspend for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32) -> impl Future<Output = ()>;
}

/// Device level control
pub trait SystemControl {
    /// Restart the device
    ///
    /// On hardware this does not return.
    fn restart(&mut self);
}
