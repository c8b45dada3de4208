//! Scripted serial port and virtual clock for unit tests

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use scmd_hal::{Clock, ErrorType, UartRx, UartTx};

/// Error injected by [`MockUart`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Shared virtual time in nanoseconds
type Time = Rc<Cell<u64>>;

/// In-memory port: reads drain `rx`, writes append to `tx`
#[derive(Debug, Default)]
pub struct MockUart {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub flushes: usize,
    pub fail_reads: bool,
    pub fail_writes: bool,
    time: Time,
    /// Bytes that become readable once virtual time reaches the key (µs)
    delayed: Vec<(u64, Vec<u8>)>,
}

impl MockUart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rx(bytes: &[u8]) -> Self {
        let mut port = Self::new();
        port.rx.extend(bytes);
        port
    }

    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Make `bytes` readable at virtual time `at_us`
    pub fn rx_after_us(&mut self, at_us: u64, bytes: &[u8]) {
        self.delayed.push((at_us, bytes.to_vec()));
    }

    fn release_due(&mut self) {
        let now_us = self.time.get() / 1_000;
        let mut i = 0;
        while i < self.delayed.len() {
            if self.delayed[i].0 <= now_us {
                let (_, bytes) = self.delayed.remove(i);
                self.rx.extend(bytes);
            } else {
                i += 1;
            }
        }
    }
}

impl ErrorType for MockUart {
    type Error = MockError;
}

impl UartTx for MockUart {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), MockError> {
        if self.fail_writes {
            return Err(MockError);
        }
        self.tx.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), MockError> {
        self.flushes += 1;
        Ok(())
    }
}

impl UartRx for MockUart {
    fn bytes_available(&mut self) -> Result<usize, MockError> {
        if self.fail_reads {
            return Err(MockError);
        }
        self.release_due();
        Ok(self.rx.len())
    }

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, MockError> {
        if self.fail_reads {
            return Err(MockError);
        }
        self.release_due();
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

/// Clock that only advances when delayed
#[derive(Debug, Default, Clone)]
pub struct MockClock {
    time: Time,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive `port`'s delayed bytes from this clock
    pub fn sharing_time_with(mut self, port: &MockUart) -> Self {
        self.time = port.time.clone();
        self
    }
}

impl DelayNs for MockClock {
    fn delay_ns(&mut self, ns: u32) {
        self.time.set(self.time.get() + ns as u64);
    }
}

impl Clock for MockClock {
    fn now_us(&mut self) -> u64 {
        self.time.get() / 1_000
    }
}
