//! Header encoding and decoding
//!
//! Header format (8 bytes):
//! - MAGIC 1 (1 byte): 0x42
//! - MAGIC 2 (1 byte): 0x24
//! - VERSION (1 byte): protocol version, must match exactly
//! - COMMAND (1 byte): application opcode
//! - ADDRESS (1 byte): sender id (high nibble), target id (low nibble)
//! - LENGTH (2 bytes): payload length, big-endian
//! - CHECKSUM (1 byte): CRC-8 over all 8 bytes with this byte as 0

use crate::address::{self, DeviceId};
use crate::checksum::checksum;
use crate::chunk::chunk_count;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// First synchronization byte
pub const MAGIC_1: u8 = 0x42;

/// Second synchronization byte
pub const MAGIC_2: u8 = 0x24;

/// Encoded header size in bytes
pub const HEADER_LEN: usize = 8;

const OFFSET_VERSION: usize = 2;
const OFFSET_COMMAND: usize = 3;
const OFFSET_ADDRESS: usize = 4;
const OFFSET_LENGTH: usize = 5;
const OFFSET_CHECKSUM: usize = 7;

/// Wire format version
///
/// V2 carries sender and target nibbles. V1 is a point-to-point variant
/// with its own version byte: its address byte is always zero and
/// receivers accept every header.
///
/// Older unaddressed firmware sends version 0x02 with a zero address
/// byte, not 0x01. Those frames read as V2 traffic between masters, so
/// they interoperate with a V2 master but are rejected by a V1 endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ProtocolVersion {
    /// Point-to-point, no addressing
    V1 = 0x01,
    /// Addressed, up to 16 endpoints
    #[default]
    V2 = 0x02,
}

impl ProtocolVersion {
    /// Version byte as sent on the wire
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parse a version byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ProtocolVersion::V1),
            0x02 => Some(ProtocolVersion::V2),
            _ => None,
        }
    }

    /// Whether the address byte carries sender/target nibbles
    pub fn is_addressed(self) -> bool {
        matches!(self, ProtocolVersion::V2)
    }
}

/// Reasons a received header is rejected
///
/// Checked in declaration order: a header with both a bad magic and a bad
/// checksum reports `BadMagic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderError {
    /// Magic bytes are not 0x42 0x24
    BadMagic,
    /// Version byte differs from the endpoint's version
    BadVersion(u8),
    /// CRC mismatch
    BadChecksum { expected: u8, actual: u8 },
    /// Valid header for a different endpoint
    NotAddressedToUs { target: DeviceId },
}

/// A decoded or to-be-encoded header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Header {
    /// Wire format version
    pub version: ProtocolVersion,
    /// Application opcode, opaque to the protocol
    pub command: u8,
    /// Originating endpoint
    pub sender: DeviceId,
    /// Destination endpoint
    pub target: DeviceId,
    /// Total payload length in bytes
    pub length: u16,
}

impl Header {
    /// Create a header
    pub fn new(
        version: ProtocolVersion,
        command: u8,
        sender: DeviceId,
        target: DeviceId,
        length: u16,
    ) -> Self {
        Self {
            version,
            command,
            sender,
            target,
            length,
        }
    }

    /// Number of chunks that follow this header
    pub fn chunk_count(&self) -> usize {
        chunk_count(self.length as usize)
    }

    /// Encode to wire bytes
    ///
    /// Under V1 the address byte is written as zero.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let address = if self.version.is_addressed() {
            address::pack(self.sender, self.target)
        } else {
            0
        };
        let [len_hi, len_lo] = self.length.to_be_bytes();

        let mut bytes = [
            MAGIC_1,
            MAGIC_2,
            self.version.as_byte(),
            self.command,
            address,
            len_hi,
            len_lo,
            0,
        ];
        bytes[OFFSET_CHECKSUM] = checksum(&bytes);
        bytes
    }

    /// Validate and decode wire bytes on behalf of endpoint `own`
    ///
    /// Under V1 there is no address filtering; the sender decodes as master
    /// and the target as `own`.
    pub fn decode(
        bytes: &[u8; HEADER_LEN],
        version: ProtocolVersion,
        own: DeviceId,
    ) -> Result<Self, HeaderError> {
        if bytes[0] != MAGIC_1 || bytes[1] != MAGIC_2 {
            return Err(HeaderError::BadMagic);
        }
        if bytes[OFFSET_VERSION] != version.as_byte() {
            return Err(HeaderError::BadVersion(bytes[OFFSET_VERSION]));
        }

        let actual = bytes[OFFSET_CHECKSUM];
        let mut zeroed = *bytes;
        zeroed[OFFSET_CHECKSUM] = 0;
        let expected = checksum(&zeroed);
        if actual != expected {
            return Err(HeaderError::BadChecksum { expected, actual });
        }

        let (sender, target) = if version.is_addressed() {
            address::unpack(bytes[OFFSET_ADDRESS])
        } else {
            (DeviceId::MASTER, own)
        };
        if !address::accepts(target, own) {
            return Err(HeaderError::NotAddressedToUs { target });
        }

        Ok(Self {
            version,
            command: bytes[OFFSET_COMMAND],
            sender,
            target,
            length: u16::from_be_bytes([bytes[OFFSET_LENGTH], bytes[OFFSET_LENGTH + 1]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(n: u8) -> DeviceId {
        DeviceId::new(n).unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let header = Header::new(ProtocolVersion::V2, 0x10, id(1), id(2), 5);
        let bytes = header.encode();

        assert_eq!(bytes[0], MAGIC_1);
        assert_eq!(bytes[1], MAGIC_2);
        assert_eq!(bytes[2], 0x02); // version
        assert_eq!(bytes[3], 0x10); // command
        assert_eq!(bytes[4], 0x12); // sender 1, target 2
        assert_eq!(bytes[5], 0x00); // length hi
        assert_eq!(bytes[6], 0x05); // length lo

        let mut zeroed = bytes;
        zeroed[7] = 0;
        assert_eq!(bytes[7], checksum(&zeroed));
    }

    #[test]
    fn test_length_is_big_endian() {
        let bytes = Header::new(ProtocolVersion::V2, 0, id(0), id(0), 0x0140).encode();
        assert_eq!(bytes[5], 0x01);
        assert_eq!(bytes[6], 0x40);
    }

    #[test]
    fn test_v1_has_zero_address() {
        let bytes = Header::new(ProtocolVersion::V1, 0x01, id(4), id(9), 1).encode();
        assert_eq!(bytes[2], 0x01);
        assert_eq!(bytes[4], 0x00);
    }

    #[test]
    fn test_decode_roundtrip() {
        let header = Header::new(ProtocolVersion::V2, 0x10, id(1), id(2), 5);
        let decoded = Header::decode(&header.encode(), ProtocolVersion::V2, id(2)).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.chunk_count(), 1);
    }

    #[test]
    fn test_v1_accepts_any_endpoint() {
        let bytes = Header::new(ProtocolVersion::V1, 0x33, id(5), id(6), 64).encode();
        let decoded = Header::decode(&bytes, ProtocolVersion::V1, id(11)).unwrap();
        assert_eq!(decoded.command, 0x33);
        assert_eq!(decoded.sender, DeviceId::MASTER);
        assert_eq!(decoded.target, id(11));
        assert_eq!(decoded.length, 64);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = Header::new(ProtocolVersion::V2, 1, id(0), id(1), 0).encode();
        bytes[1] = 0x25;
        assert_eq!(
            Header::decode(&bytes, ProtocolVersion::V2, id(1)),
            Err(HeaderError::BadMagic)
        );
    }

    #[test]
    fn test_version_mismatch() {
        let bytes = Header::new(ProtocolVersion::V1, 1, id(0), id(1), 0).encode();
        assert_eq!(
            Header::decode(&bytes, ProtocolVersion::V2, id(1)),
            Err(HeaderError::BadVersion(0x01))
        );
    }

    #[test]
    fn test_magic_checked_before_version_and_checksum() {
        let mut bytes = Header::new(ProtocolVersion::V2, 1, id(0), id(1), 0).encode();
        bytes[0] = 0x00;
        bytes[2] = 0x7F;
        bytes[7] ^= 0xFF;
        assert_eq!(
            Header::decode(&bytes, ProtocolVersion::V2, id(1)),
            Err(HeaderError::BadMagic)
        );
    }

    #[test]
    fn test_version_checked_before_checksum() {
        let mut bytes = Header::new(ProtocolVersion::V2, 1, id(0), id(1), 0).encode();
        bytes[2] = 0x03;
        assert_eq!(
            Header::decode(&bytes, ProtocolVersion::V2, id(1)),
            Err(HeaderError::BadVersion(0x03))
        );
    }

    #[test]
    fn test_checksum_checked_before_address() {
        let mut bytes = Header::new(ProtocolVersion::V2, 1, id(0), id(3), 0).encode();
        bytes[7] ^= 0x01;
        assert!(matches!(
            Header::decode(&bytes, ProtocolVersion::V2, id(4)),
            Err(HeaderError::BadChecksum { .. })
        ));
    }

    #[test]
    fn test_not_addressed_to_us() {
        let bytes = Header::new(ProtocolVersion::V2, 1, id(0), id(3), 0).encode();
        assert_eq!(
            Header::decode(&bytes, ProtocolVersion::V2, id(4)),
            Err(HeaderError::NotAddressedToUs { target: id(3) })
        );
    }

    #[test]
    fn test_legacy_unaddressed_frame_reaches_v2_master() {
        // Older unaddressed firmware: version 0x02, address byte left at 0
        let mut bytes = [MAGIC_1, MAGIC_2, 0x02, 0x21, 0x00, 0x00, 0x03, 0x00];
        bytes[OFFSET_CHECKSUM] = checksum(&bytes);

        let decoded = Header::decode(&bytes, ProtocolVersion::V2, DeviceId::MASTER).unwrap();
        assert_eq!(decoded.sender, DeviceId::MASTER);
        assert_eq!(decoded.target, DeviceId::MASTER);
        assert_eq!(decoded.command, 0x21);
        assert_eq!(decoded.length, 3);

        assert_eq!(
            Header::decode(&bytes, ProtocolVersion::V1, DeviceId::MASTER),
            Err(HeaderError::BadVersion(0x02))
        );
        assert_eq!(
            Header::decode(&bytes, ProtocolVersion::V2, id(3)),
            Err(HeaderError::NotAddressedToUs {
                target: DeviceId::MASTER
            })
        );
    }

    #[test]
    fn test_version_byte_parse() {
        assert_eq!(ProtocolVersion::from_byte(0x01), Some(ProtocolVersion::V1));
        assert_eq!(ProtocolVersion::from_byte(0x02), Some(ProtocolVersion::V2));
        assert_eq!(ProtocolVersion::from_byte(0x03), None);
        assert!(ProtocolVersion::V2.is_addressed());
        assert!(!ProtocolVersion::V1.is_addressed());
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            command in any::<u8>(),
            sender in 0u8..16,
            target in 0u8..16,
            length in 0u16..=320,
        ) {
            let header = Header::new(ProtocolVersion::V2, command, id(sender), id(target), length);
            let decoded = Header::decode(&header.encode(), ProtocolVersion::V2, id(target));
            prop_assert_eq!(decoded, Ok(header));
        }

        #[test]
        fn prop_substitution_after_version_is_checksum_error(
            command in any::<u8>(),
            target in 0u8..16,
            length in 0u16..=320,
            offset in 3usize..HEADER_LEN,
            delta in 1u8..=255,
        ) {
            let mut bytes = Header::new(ProtocolVersion::V2, command, id(0), id(target), length).encode();
            bytes[offset] ^= delta;
            let result = Header::decode(&bytes, ProtocolVersion::V2, id(target));
            prop_assert!(
                matches!(result, Err(HeaderError::BadChecksum { .. })),
                "offset {} delta {:#x}: {:?}", offset, delta, result
            );
        }
    }
}
