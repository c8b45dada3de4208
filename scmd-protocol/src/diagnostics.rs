//! Optional diagnostic text output
//!
//! Some boards have a spare serial console but no defmt probe attached.
//! A [`DiagnosticSink`] receives one short line per failed receive. It is
//! write-only and never influences protocol behaviour.

use core::fmt::Write;

use heapless::String;

use crate::error::LinkError;

/// Longest diagnostic line; longer records are truncated
pub const MAX_LINE_LEN: usize = 80;

/// Line-oriented text output
pub trait DiagnosticSink {
    /// Write one line (without terminator)
    fn write_line(&mut self, line: &str);

    /// Whether records should be formatted at all
    fn enabled(&self) -> bool {
        true
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn write_line(&mut self, line: &str) {
        T::write_line(self, line)
    }

    fn enabled(&self) -> bool {
        T::enabled(self)
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl DiagnosticSink for NoDiagnostics {
    fn write_line(&mut self, _line: &str) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Format the record for a dropped receive
pub fn receive_failure_line(error: LinkError) -> String<MAX_LINE_LEN> {
    let mut line = String::new();
    // Overflow only truncates the record
    let _ = write!(
        line,
        "scmd: receive failed status={:#04x} ({})",
        error.code(),
        error
    );
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_line() {
        let line = receive_failure_line(LinkError::BadChecksum);
        assert_eq!(line.as_str(), "scmd: receive failed status=0x04 (bad checksum)");
    }

    #[test]
    fn test_longest_record_fits() {
        let line = receive_failure_line(LinkError::BufferTooSmall);
        assert!(line.ends_with("(payload exceeds receive buffer)"));
    }

    #[test]
    fn test_no_diagnostics_disabled() {
        assert!(!NoDiagnostics.enabled());
    }
}
