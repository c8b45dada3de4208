//! Link status codes

use crate::chunk::ChunkError;
use crate::header::HeaderError;

/// Why a send or receive call failed
///
/// Every failure is terminal for the call that produced it. Nothing is
/// retried and no bytes are drained, so after a failed receive the stream
/// may sit mid-message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Fewer bytes than a header or chunk arrived before the port timed out
    ShortRead,
    /// Header does not start with the magic bytes
    BadMagic,
    /// Header carries a different protocol version
    BadVersion,
    /// Header or chunk checksum mismatch
    BadChecksum,
    /// Declared payload does not fit the receive buffer
    BufferTooSmall,
    /// Acknowledgment missing or not the expected byte
    BadAck,
    /// Header was valid but targets another endpoint
    NotAddressedToUs,
    /// Outgoing payload longer than the protocol maximum
    PayloadTooLarge,
    /// The serial port reported an I/O error
    Transport,
}

impl LinkError {
    /// Numeric status code, as reported by other SCMD implementations
    ///
    /// 0x00 is reserved for success.
    pub fn code(self) -> u8 {
        match self {
            LinkError::ShortRead => 0x01,
            LinkError::BadMagic => 0x02,
            LinkError::BadVersion => 0x03,
            LinkError::BadChecksum => 0x04,
            LinkError::BufferTooSmall => 0x05,
            LinkError::BadAck => 0x06,
            LinkError::NotAddressedToUs => 0x07,
            LinkError::PayloadTooLarge => 0x08,
            LinkError::Transport => 0x09,
        }
    }

    /// Parse a status code; `None` for 0x00 and unknown codes
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(LinkError::ShortRead),
            0x02 => Some(LinkError::BadMagic),
            0x03 => Some(LinkError::BadVersion),
            0x04 => Some(LinkError::BadChecksum),
            0x05 => Some(LinkError::BufferTooSmall),
            0x06 => Some(LinkError::BadAck),
            0x07 => Some(LinkError::NotAddressedToUs),
            0x08 => Some(LinkError::PayloadTooLarge),
            0x09 => Some(LinkError::Transport),
            _ => None,
        }
    }

    /// Whether the peer sent something this endpoint could not accept,
    /// as opposed to a valid message meant for someone else
    pub fn is_corruption(self) -> bool {
        matches!(
            self,
            LinkError::ShortRead
                | LinkError::BadMagic
                | LinkError::BadVersion
                | LinkError::BadChecksum
        )
    }
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            LinkError::ShortRead => "short read",
            LinkError::BadMagic => "bad magic",
            LinkError::BadVersion => "unsupported protocol version",
            LinkError::BadChecksum => "bad checksum",
            LinkError::BufferTooSmall => "payload exceeds receive buffer",
            LinkError::BadAck => "bad acknowledgment",
            LinkError::NotAddressedToUs => "not addressed to us",
            LinkError::PayloadTooLarge => "payload too large",
            LinkError::Transport => "transport error",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for LinkError {}

impl From<HeaderError> for LinkError {
    fn from(e: HeaderError) -> Self {
        match e {
            HeaderError::BadMagic => LinkError::BadMagic,
            HeaderError::BadVersion(_) => LinkError::BadVersion,
            HeaderError::BadChecksum { .. } => LinkError::BadChecksum,
            HeaderError::NotAddressedToUs { .. } => LinkError::NotAddressedToUs,
        }
    }
}

impl From<ChunkError> for LinkError {
    fn from(_: ChunkError) -> Self {
        LinkError::BadChecksum
    }
}
