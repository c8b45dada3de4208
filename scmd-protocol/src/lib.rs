//! SCMD Serial Command Protocol
//!
//! This crate implements a half-duplex, addressed command protocol for
//! microcontrollers talking over a plain byte stream (typically a UART).
//! One endpoint delivers a `(command, payload)` message to one of up to 16
//! peers, with every unit on the wire checksummed and acknowledged.
//!
//! # Protocol Overview
//!
//! A message is an 8-byte header followed by zero or more 33-byte chunks:
//! ```text
//! Header
//! ┌─────────┬─────────┬─────────┬─────────┬───────────┬────────────┬─────┐
//! │ MAGIC 1 │ MAGIC 2 │ VERSION │ COMMAND │ SRC │ DST │ LENGTH(BE) │ CRC │
//! │ 0x42    │ 0x24    │ 1B      │ 1B      │ 4b  │ 4b  │ 2B         │ 1B  │
//! └─────────┴─────────┴─────────┴─────────┴───────────┴────────────┴─────┘
//!
//! Chunk (repeated ceil(LENGTH / 32) times)
//! ┌──────────────────────────────────────┬─────┐
//! │ DATA (32B, zero padded)              │ CRC │
//! └──────────────────────────────────────┴─────┘
//! ```
//!
//! Every header and chunk is answered with a single `0x55` acknowledgment
//! byte once it has been validated. The sender waits for that byte before
//! sending the next unit (stop-and-wait). A receiver that rejects a unit
//! stays silent; the sender's acknowledgment wait then times out. There is
//! no retransmission and no resynchronisation: any failure ends the call.
//!
//! # Layers
//!
//! - [`checksum`] - Dallas/Maxim CRC-8 used by every unit
//! - [`header`] / [`chunk`] - Pure encoders and decoders
//! - [`ack`] - Acknowledgment byte and bounded wait
//! - [`address`] - 4-bit device identities and target filtering
//! - [`link`] - Full message send/receive over a [`scmd_hal::Uart`]
//! - [`dispatch`] - Non-blocking poll step invoking a [`CommandHandler`]

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod ack;
pub mod address;
pub mod checksum;
pub mod chunk;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod header;
pub mod link;

#[cfg(test)]
mod mock;

pub use ack::ACK_BYTE;
pub use address::DeviceId;
pub use checksum::checksum;
pub use chunk::{CHUNK_DATA_LEN, CHUNK_LEN};
pub use config::LinkConfig;
pub use diagnostics::{DiagnosticSink, NoDiagnostics};
pub use dispatch::{CommandHandler, Dispatcher, PollOutcome};
pub use error::LinkError;
pub use header::{Header, ProtocolVersion, HEADER_LEN, MAGIC_1, MAGIC_2};
pub use link::{Link, Message};

/// Largest payload a single message may carry
pub const MAX_PAYLOAD_LEN: usize = 320;
