//! Time abstractions
//!
//! Acknowledgment waits are bounded by a wall-clock deadline, so the
//! protocol needs a monotonic time source in addition to a blocking delay.

use embedded_hal::delay::DelayNs;

/// Monotonic clock with blocking delay
///
/// `now_us` must never go backwards. Wrapping is not handled; a 64-bit
/// microsecond counter outlives any device.
pub trait Clock: DelayNs {
    /// Microseconds since an arbitrary fixed origin
    fn now_us(&mut self) -> u64;

    /// Microseconds elapsed since `earlier`
    fn elapsed_since_us(&mut self, earlier: u64) -> u64 {
        self.now_us().saturating_sub(earlier)
    }
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_us(&mut self) -> u64 {
        T::now_us(self)
    }
}

/// Host clock backed by [`std::time::Instant`]
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl DelayNs for StdClock {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_us(&mut self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}
