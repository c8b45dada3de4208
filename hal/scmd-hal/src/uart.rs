//! UART serial communication abstractions
//!
//! Provides the blocking byte-stream traits the link protocol is written
//! against. Transmit and receive halves are separate traits so that a
//! split peripheral can implement them independently.

use core::fmt::Debug;

/// Error type shared by both halves of a serial port
pub trait ErrorType {
    /// Error type for transport operations
    type Error: Debug;
}

impl<T: ErrorType + ?Sized> ErrorType for &mut T {
    type Error = T::Error;
}

/// UART transmitter
pub trait UartTx: ErrorType {
    /// Write all of `data` to the UART
    ///
    /// Blocks until every byte has been queued or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data onto the wire
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx: ErrorType {
    /// Number of bytes that can be read without blocking
    ///
    /// Implementations that cannot count may return 1 to signal "at least
    /// one byte pending".
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read into `buf` until it is full or the port's read timeout expires
    ///
    /// Returns the number of bytes actually read. A value smaller than
    /// `buf.len()` means the timeout expired first.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte from the UART
    ///
    /// Callers should check [`bytes_available`](Self::bytes_available)
    /// first; the value returned after a timed-out read is unspecified.
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_blocking(&mut buf)?;
        Ok(buf[0])
    }
}

impl<T: UartTx + ?Sized> UartTx for &mut T {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_blocking(self, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }
}

impl<T: UartRx + ?Sized> UartRx for &mut T {
    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        T::bytes_available(self)
    }

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        T::read_blocking(self, buf)
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        T::read_byte(self)
    }
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// UART line configuration
///
/// The protocol itself is agnostic to line settings; both ends simply
/// have to agree. This is the configuration SCMD endpoints ship with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Number of line symbols needed to carry one byte
    pub fn bits_per_byte(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        1 + data + parity + stop
    }

    /// Time on the wire for `len` bytes, in microseconds (rounded up)
    ///
    /// Useful for sizing a port's read timeout: it must cover at least one
    /// full chunk at the configured baud rate.
    pub fn transfer_time_us(&self, len: usize) -> u64 {
        let bits = len as u64 * self.bits_per_byte() as u64;
        (bits * 1_000_000).div_ceil(self.baudrate.max(1) as u64)
    }

    /// Read deadline for a `len`-byte unit, in microseconds
    ///
    /// Twice the wire time plus one millisecond for inter-byte gaps and
    /// sender turnaround.
    pub fn read_timeout_us(&self, len: usize) -> u64 {
        self.transfer_time_us(len) * 2 + READ_TIMEOUT_SLACK_US
    }
}

/// Fixed slack added to every read deadline
pub const READ_TIMEOUT_SLACK_US: u64 = 1_000;

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_8n1() {
        let cfg = UartConfig::default();
        assert_eq!(cfg.baudrate, 115200);
        assert_eq!(cfg.bits_per_byte(), 10);
    }

    #[test]
    fn test_transfer_time() {
        let cfg = UartConfig {
            baudrate: 9600,
            ..UartConfig::default()
        };
        // 33 bytes * 10 bits at 9600 baud = 34.375 ms
        assert_eq!(cfg.transfer_time_us(33), 34_375);
    }

    #[test]
    fn test_parity_and_two_stop_bits() {
        let cfg = UartConfig {
            baudrate: 115200,
            data_bits: DataBits::Seven,
            parity: Parity::Even,
            stop_bits: StopBits::Two,
        };
        assert_eq!(cfg.bits_per_byte(), 11);
    }

    #[test]
    fn test_read_timeout_scales_with_baudrate() {
        let slow = UartConfig {
            baudrate: 9600,
            ..UartConfig::default()
        };
        assert_eq!(slow.read_timeout_us(33), 2 * 34_375 + READ_TIMEOUT_SLACK_US);
        // Default 115200: 8 bytes take 695 us on the wire
        assert_eq!(UartConfig::default().read_timeout_us(8), 2 * 695 + READ_TIMEOUT_SLACK_US);
        assert_eq!(UartConfig::default().read_timeout_us(0), READ_TIMEOUT_SLACK_US);
    }
}
