//! Periodic supervisor loop
//!
//! [`Runner::run`] ticks the supervisor every [`DRIVER_PERIOD_MS`], passing
//! the time since the previous cycle started, and returns once the
//! supervisor stops. Where it runs depends on the target:
//! - bare metal: awaited inside an executor task with an `EmbassyTicker`
//!   (`embassy-time` feature)
//! - hosted: [`spawn`] moves it onto a named OS thread (`std` feature)

use embassy_sync::blocking_mutex::raw::RawMutex;
use hal_abstractions::{ClockService, LinkDriver, Ticker};

use crate::config::DRIVER_PERIOD_MS;
use crate::supervisor::Supervisor;

/// Background driver handed out by [`Supervisor::begin`]
///
/// While a runner exists the supervisor refuses another `begin`.
#[must_use = "the supervisor does nothing unless its runner is driven"]
pub struct Runner<'a, M, L, C> {
    supervisor: &'a Supervisor<M, L, C>,
}

impl<'a, M, L, C> Runner<'a, M, L, C> {
    pub(crate) fn new(supervisor: &'a Supervisor<M, L, C>) -> Self {
        Self { supervisor }
    }
}

impl<M: RawMutex, L: LinkDriver, C: ClockService> Runner<'_, M, L, C> {
    /// Drive the supervisor until it is stopped
    pub async fn run<T: Ticker>(self, mut ticker: T) {
        info!("Supervisor loop started");

        let mut last_start: Option<u64> = None;
        while self.supervisor.is_running() {
            let start = ticker.now_ms();
            let elapsed_ms = match last_start {
                Some(previous) => clamp_ms(start.saturating_sub(previous)),
                None => 0,
            };
            last_start = Some(start);

            self.supervisor.tick(elapsed_ms);

            let cost_ms = clamp_ms(ticker.now_ms().saturating_sub(start));
            if cost_ms < DRIVER_PERIOD_MS {
                ticker.delay_ms(DRIVER_PERIOD_MS - cost_ms).await;
            } else {
                debug!("Supervisor cycle overran: {} ms", cost_ms);
            }
        }

        info!("Supervisor loop stopped");
    }
}

impl<M, L, C> Drop for Runner<'_, M, L, C> {
    fn drop(&mut self) {
        self.supervisor.runner_finished();
    }
}

fn clamp_ms(ms: u64) -> u32 {
    u32::try_from(ms).unwrap_or(u32::MAX)
}

#[cfg(any(test, feature = "std"))]
pub use hosted::{spawn, StdTicker};

#[cfg(any(test, feature = "std"))]
mod hosted {
    use std::thread::{self, JoinHandle};
    use std::time::{Duration, Instant};

    use embassy_sync::blocking_mutex::raw::RawMutex;
    use hal_abstractions::{ClockService, LinkDriver, Monotonic, Ticker};

    use super::Runner;

    const THREAD_NAME: &str = "wifi-supervisor";
    const STACK_SIZE: usize = 8 * 1024;

    /// Ticker over the OS monotonic clock, sleeping the calling thread
    pub struct StdTicker {
        origin: Instant,
    }

    impl StdTicker {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
            }
        }
    }

    impl Default for StdTicker {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Monotonic for StdTicker {
        fn now_ms(&self) -> u64 {
            u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
        }
    }

    impl Ticker for StdTicker {
        async fn delay_ms(&mut self, ms: u32) {
            thread::sleep(Duration::from_millis(u64::from(ms)));
        }
    }

    /// Run `runner` on a dedicated thread
    ///
    /// The supervisor is shared with the calling thread, so `M` must be a
    /// thread-safe raw mutex such as `CriticalSectionRawMutex`.
    pub fn spawn<M, L, C>(runner: Runner<'static, M, L, C>) -> std::io::Result<JoinHandle<()>>
    where
        M: RawMutex + Sync + 'static,
        L: LinkDriver + Send + 'static,
        C: ClockService + Send + 'static,
    {
        thread::Builder::new()
            .name(THREAD_NAME.into())
            .stack_size(STACK_SIZE)
            .spawn(move || embassy_futures::block_on(runner.run(StdTicker::new())))
    }
}

#[cfg(feature = "embassy-time")]
pub use embassy::EmbassyTicker;

#[cfg(feature = "embassy-time")]
mod embassy {
    use embassy_time::{Instant, Timer};
    use hal_abstractions::{Monotonic, Ticker};

    /// Ticker over the embassy time driver
    #[derive(Debug, Clone, Copy, Default)]
    pub struct EmbassyTicker;

    impl Monotonic for EmbassyTicker {
        fn now_ms(&self) -> u64 {
            Instant::now().as_millis()
        }
    }

    impl Ticker for EmbassyTicker {
        async fn delay_ms(&mut self, ms: u32) {
            Timer::after_millis(u64::from(ms)).await;
        }
    }
}
