//! Endpoint configuration

use crate::address::DeviceId;
use crate::header::ProtocolVersion;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default acknowledgment wait
pub const DEFAULT_ACK_TIMEOUT_MS: u32 = 100;

/// Default spacing between acknowledgment polls
pub const DEFAULT_ACK_POLL_INTERVAL_US: u32 = 1_000;

/// Per-endpoint link settings
///
/// Fixed once a [`Link`](crate::Link) is built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// This endpoint's identity
    pub device_id: DeviceId,
    /// Wire format spoken (and required from peers)
    pub version: ProtocolVersion,
    /// How long a sender waits for each acknowledgment
    pub ack_timeout_ms: u32,
    /// Delay between checks for a pending acknowledgment
    pub ack_poll_interval_us: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device_id: DeviceId::MASTER,
            version: ProtocolVersion::V2,
            ack_timeout_ms: DEFAULT_ACK_TIMEOUT_MS,
            ack_poll_interval_us: DEFAULT_ACK_POLL_INTERVAL_US,
        }
    }
}

impl LinkConfig {
    /// Master endpoint with default timing
    pub fn master() -> Self {
        Self::default()
    }

    /// Device endpoint with default timing
    pub fn device(id: DeviceId) -> Self {
        Self::default().with_device_id(id)
    }

    pub fn with_device_id(mut self, id: DeviceId) -> Self {
        self.device_id = id;
        self
    }

    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_ack_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.ack_timeout_ms = timeout_ms;
        self
    }

    /// Zero is clamped to 1 µs so the wait loop always makes progress.
    pub fn with_ack_poll_interval_us(mut self, interval_us: u32) -> Self {
        self.ack_poll_interval_us = interval_us.max(1);
        self
    }
}
