//! Device identities and address filtering
//!
//! Each endpoint has a fixed 4-bit identity. The header's address byte
//! packs the sender into the high nibble and the target into the low
//! nibble. There is no broadcast address.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 4-bit endpoint identity (0-15)
///
/// Identity 0 is the master by convention; for filtering purposes it is
/// an ordinary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct DeviceId(u8);

/// Error for identities outside 0-15
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidDeviceId(pub u8);

impl core::fmt::Display for InvalidDeviceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "device id {} out of range 0-15", self.0)
    }
}

impl DeviceId {
    /// The master endpoint
    pub const MASTER: DeviceId = DeviceId(0);

    /// Highest valid identity
    pub const MAX: DeviceId = DeviceId(0x0F);

    /// Create an identity, rejecting values above 15
    pub const fn new(id: u8) -> Option<Self> {
        if id <= Self::MAX.0 {
            Some(Self(id))
        } else {
            None
        }
    }

    /// Take the low nibble of `byte`
    pub const fn from_nibble(byte: u8) -> Self {
        Self(byte & 0x0F)
    }

    /// Raw 4-bit value
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Whether this is the master identity
    pub const fn is_master(self) -> bool {
        self.0 == Self::MASTER.0
    }
}

impl TryFrom<u8> for DeviceId {
    type Error = InvalidDeviceId;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidDeviceId(value))
    }
}

impl From<DeviceId> for u8 {
    fn from(id: DeviceId) -> u8 {
        id.0
    }
}

impl core::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pack sender and target into a header address byte
pub const fn pack(sender: DeviceId, target: DeviceId) -> u8 {
    (sender.0 << 4) | target.0
}

/// Split a header address byte into `(sender, target)`
pub const fn unpack(byte: u8) -> (DeviceId, DeviceId) {
    (DeviceId::from_nibble(byte >> 4), DeviceId::from_nibble(byte))
}

/// Whether a header targeted at `target` is for the endpoint `own`
pub fn accepts(target: DeviceId, own: DeviceId) -> bool {
    target == own
}
