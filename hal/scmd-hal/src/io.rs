//! Adapter from `embedded-io` peripherals
//!
//! Most chip HALs expose their blocking UART drivers through the
//! `embedded-io` traits. [`IoUart`] wraps such a driver so it can be used
//! as a [`Uart`](crate::Uart) without a hand-written shim per chip.
//!
//! `embedded-io` reads block until at least one byte arrives, so the
//! adapter only calls `read` once `read_ready` reports data and bounds
//! every [`read_blocking`](UartRx::read_blocking) with a deadline sized
//! from the line configuration.

use embedded_io::{Read, ReadReady, Write};

use crate::clock::Clock;
use crate::uart::{ErrorType, UartConfig, UartRx, UartTx};

/// Wraps an `embedded-io` `Read + Write + ReadReady` peripheral
#[derive(Debug)]
pub struct IoUart<T, C> {
    inner: T,
    clock: C,
    config: UartConfig,
}

impl<T, C: Clock> IoUart<T, C> {
    /// Wrap a peripheral running with the given line settings
    pub fn new(inner: T, clock: C, config: UartConfig) -> Self {
        Self {
            inner,
            clock,
            config,
        }
    }

    /// Borrow the wrapped peripheral
    pub fn inner(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Release the wrapped peripheral and clock
    pub fn into_parts(self) -> (T, C) {
        (self.inner, self.clock)
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }
}

impl<T: embedded_io::ErrorType, C> ErrorType for IoUart<T, C> {
    type Error = T::Error;
}

impl<T: Write, C> UartTx for IoUart<T, C> {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

impl<T: Read + ReadReady, C: Clock> UartRx for IoUart<T, C> {
    /// `ReadReady` only reports readiness, so this is 0 or 1.
    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        Ok(usize::from(self.inner.read_ready()?))
    }

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let budget = self.config.read_timeout_us(buf.len());
        let byte_time = self.config.transfer_time_us(1).clamp(1, u32::MAX as u64) as u32;
        let start = self.clock.now_us();

        let mut filled = 0;
        while filled < buf.len() {
            if self.inner.read_ready()? {
                // Zero only at end of stream
                match self.inner.read(&mut buf[filled..])? {
                    0 => break,
                    n => filled += n,
                }
            } else if self.clock.elapsed_since_us(start) >= budget {
                break;
            } else {
                self.clock.delay_us(byte_time);
            }
        }
        Ok(filled)
    }
}
