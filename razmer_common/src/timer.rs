//! Wrap-safe interval timer.
//!
//! Every polling loop in the emulator paces itself with an [`IntervalTimer`]
//! over a free-running `u32` counter. Elapsed time is computed with wrapping
//! subtraction, so a counter that rolls over from `u32::MAX` to `0` in the
//! middle of an interval still compares correctly as long as less than one
//! full counter period has passed.
//!
//! Time sources implement [`Clock`]:
//!
//! | Clock | Resolution | Use |
//! |-------|------------|-----|
//! | [`MillisClock`] | 1 ms | mode sequencer, frame cadence |
//! | [`MicrosClock`] | 1 µs | scan strobes |
//! | [`ManualClock`] | caller defined | tests, deterministic simulation |

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic counter source.
pub trait Clock {
    /// Current counter value. Wraps modulo 2^32.
    fn now(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> u32 {
        (**self).now()
    }
}

/// Millisecond counter since an epoch, truncated to `u32` like `millis()`.
#[derive(Debug, Clone, Copy)]
pub struct MillisClock {
    epoch: Instant,
}

impl MillisClock {
    /// Clock counting from now.
    pub fn new() -> Self {
        Self::with_epoch(Instant::now())
    }

    /// Clock counting from `epoch`.
    pub fn with_epoch(epoch: Instant) -> Self {
        Self { epoch }
    }
}

impl Default for MillisClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MillisClock {
    #[inline]
    fn now(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }
}

/// Microsecond counter since an epoch, truncated to `u32` like `micros()`.
///
/// Wraps roughly every 71.6 minutes.
#[derive(Debug, Clone, Copy)]
pub struct MicrosClock {
    epoch: Instant,
}

impl MicrosClock {
    /// Clock counting from now.
    pub fn new() -> Self {
        Self::with_epoch(Instant::now())
    }

    /// Clock counting from `epoch`.
    pub fn with_epoch(epoch: Instant) -> Self {
        Self { epoch }
    }
}

impl Default for MicrosClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MicrosClock {
    #[inline]
    fn now(&self) -> u32 {
        self.epoch.elapsed().as_micros() as u32
    }
}

/// Explicitly advanced counter.
///
/// Clones share the same counter, so a test can hand one clone to a timer
/// and keep another to move time forward. [`divided`](Self::divided) gives
/// a coarser view of the same counter, e.g. milliseconds next to
/// microseconds, the way `millis()` and `micros()` share one hardware timer.
#[derive(Debug, Clone)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
    divisor: u64,
}

impl ManualClock {
    /// Clock starting at `start`.
    pub fn new(start: u32) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(u64::from(start))),
            divisor: 1,
        }
    }

    /// View of the same counter in units of `divisor` ticks.
    pub fn divided(&self, divisor: u32) -> Self {
        Self {
            ticks: Arc::clone(&self.ticks),
            divisor: self.divisor * u64::from(divisor.max(1)),
        }
    }

    /// Advance by `delta` units of this view.
    pub fn advance(&self, delta: u32) {
        self.ticks
            .fetch_add(u64::from(delta) * self.divisor, Ordering::Relaxed);
    }

    /// Jump to an absolute value of this view.
    pub fn set(&self, value: u32) {
        self.ticks
            .store(u64::from(value) * self.divisor, Ordering::Relaxed);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> u32 {
        (self.ticks.load(Ordering::Relaxed) / self.divisor) as u32
    }
}

/// Interval timer over a [`Clock`].
///
/// Expiry compares `now - start` with wrapping subtraction, so it is
/// correct across one counter rollover.
#[derive(Debug, Clone)]
pub struct IntervalTimer<C: Clock> {
    clock: C,
    interval: u32,
    start: u32,
}

/// Timer over the host millisecond clock.
pub type MillisTimer = IntervalTimer<MillisClock>;

/// Timer over the host microsecond clock.
pub type MicrosTimer = IntervalTimer<MicrosClock>;

impl<C: Clock> IntervalTimer<C> {
    /// Timer started now with a zero interval (already expired).
    pub fn new(clock: C) -> Self {
        Self::with_interval(clock, 0)
    }

    /// Timer started now with `interval` clock units.
    pub fn with_interval(clock: C, interval: u32) -> Self {
        let start = clock.now();
        Self {
            clock,
            interval,
            start,
        }
    }

    /// Change the interval. The start point stays where it is.
    #[inline]
    pub fn set_interval(&mut self, interval: u32) {
        self.interval = interval;
    }

    /// Interval in clock units.
    #[inline]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Restart from the current counter value.
    #[inline]
    pub fn reset(&mut self) {
        self.start = self.clock.now();
    }

    /// Units since the last start.
    #[inline]
    pub fn elapsed(&self) -> u32 {
        self.clock.now().wrapping_sub(self.start)
    }

    /// Whether the interval has passed.
    ///
    /// With `auto_reset`, an expired timer restarts from the counter value
    /// sampled in this call.
    pub fn is_expired(&mut self, auto_reset: bool) -> bool {
        let now = self.clock.now();
        let expired = now.wrapping_sub(self.start) >= self.interval;
        if expired && auto_reset {
            self.start = now;
        }
        expired
    }

    /// Underlying clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
