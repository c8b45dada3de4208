//! Acknowledgment channel
//!
//! A receiver answers every header or chunk it accepts with one
//! [`ACK_BYTE`]. There is no negative acknowledgment: rejection is silence,
//! which the sender observes as a timeout.

use embedded_hal::delay::DelayNs;
use scmd_hal::{Clock, UartRx, UartTx};

/// Acknowledgment byte
pub const ACK_BYTE: u8 = 0x55;

/// How an acknowledgment wait failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckError<E> {
    /// Nothing arrived before the deadline
    Timeout,
    /// A byte arrived but was not [`ACK_BYTE`]
    Mismatch(u8),
    /// Port error while polling or reading
    Transport(E),
}

/// Bound on a single acknowledgment wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AckWait {
    /// Total time allowed, from the start of the wait
    pub timeout_us: u64,
    /// Sleep between polls of the port
    pub poll_interval_us: u32,
}

impl AckWait {
    pub fn new(timeout_ms: u32, poll_interval_us: u32) -> Self {
        Self {
            timeout_us: timeout_ms as u64 * 1_000,
            poll_interval_us: poll_interval_us.max(1),
        }
    }
}

/// Write one acknowledgment byte and flush it onto the wire
pub fn send_ack<P: UartTx>(port: &mut P) -> Result<(), P::Error> {
    port.write_blocking(&[ACK_BYTE])?;
    port.flush()
}

/// Wait for the peer's acknowledgment
///
/// Polls the port until a byte is pending or the deadline passes. The
/// first pending byte is consumed and compared; a wrong byte fails
/// immediately without waiting for a better one.
pub fn await_ack<P: UartRx, C: Clock>(
    port: &mut P,
    clock: &mut C,
    wait: AckWait,
) -> Result<(), AckError<P::Error>> {
    let start = clock.now_us();
    loop {
        if port.bytes_available().map_err(AckError::Transport)? > 0 {
            let byte = port.read_byte().map_err(AckError::Transport)?;
            return if byte == ACK_BYTE {
                Ok(())
            } else {
                Err(AckError::Mismatch(byte))
            };
        }
        if clock.elapsed_since_us(start) >= wait.timeout_us {
            return Err(AckError::Timeout);
        }
        clock.delay_us(wait.poll_interval_us);
    }
}
