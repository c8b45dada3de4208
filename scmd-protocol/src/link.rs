//! Message transceiver
//!
//! [`Link`] moves whole messages over a [`Uart`]: a header, then the
//! payload in 32-byte chunks, each unit acknowledged before the next is
//! sent. Calls block until the message is through or the first unit fails.
//!
//! ```text
//! sender                               receiver
//!   │ ── header (8B) ─────────────────▶ │  validate, filter address
//!   │ ◀──────────────────────── 0x55 ── │
//!   │ ── chunk 0 (33B) ───────────────▶ │  validate, copy
//!   │ ◀──────────────────────── 0x55 ── │
//!   │            ...                    │
//! ```

use core::fmt::Debug;

use scmd_hal::{Clock, Uart};

use crate::ack::{self, AckError, AckWait};
use crate::address::DeviceId;
use crate::chunk::{self, CHUNK_DATA_LEN, CHUNK_LEN};
use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::header::{Header, HEADER_LEN};
use crate::MAX_PAYLOAD_LEN;

/// Metadata of a received message
///
/// The payload itself lives in the buffer passed to [`Link::receive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    /// Application opcode
    pub command: u8,
    /// Endpoint that sent the message (master under V1)
    pub sender: DeviceId,
    /// Payload length in bytes
    pub len: usize,
}

impl Message {
    /// The payload within the receive buffer
    ///
    /// `None` if `buf` is shorter than the message, i.e. not the buffer it
    /// was received into.
    pub fn payload<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        buf.get(..self.len)
    }
}

/// One endpoint of an SCMD link
pub struct Link<P, C> {
    port: P,
    clock: C,
    config: LinkConfig,
}

/// Collapse a port error into [`LinkError::Transport`]
fn transport<E: Debug>(e: E) -> LinkError {
    #[cfg(feature = "defmt")]
    defmt::warn!("scmd transport error: {}", defmt::Debug2Format(&e));
    #[cfg(not(feature = "defmt"))]
    let _ = e;
    LinkError::Transport
}

impl<P: Uart, C: Clock> Link<P, C> {
    /// Master endpoint (identity 0)
    pub fn master(port: P, clock: C) -> Self {
        Self::with_config(port, clock, LinkConfig::master())
    }

    /// Device endpoint with the given identity
    pub fn device(port: P, clock: C, id: DeviceId) -> Self {
        Self::with_config(port, clock, LinkConfig::device(id))
    }

    pub fn with_config(port: P, clock: C, config: LinkConfig) -> Self {
        debug!(
            "scmd link up: id={} version={}",
            config.device_id,
            config.version
        );
        Self {
            port,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// This endpoint's identity
    pub fn device_id(&self) -> DeviceId {
        self.config.device_id
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Release the port and clock
    pub fn into_parts(self) -> (P, C) {
        (self.port, self.clock)
    }

    /// Bytes waiting on the port
    pub fn bytes_available(&mut self) -> Result<usize, LinkError> {
        self.port.bytes_available().map_err(transport)
    }

    /// Send a message to the master
    pub fn send(&mut self, command: u8, payload: &[u8]) -> Result<(), LinkError> {
        self.send_to(command, DeviceId::MASTER, payload)
    }

    /// Send a message to `target`
    ///
    /// The header and every chunk must be acknowledged in turn; the first
    /// unit that is not aborts the call. Payloads over
    /// [`MAX_PAYLOAD_LEN`] are rejected before anything is written.
    pub fn send_to(&mut self, command: u8, target: DeviceId, payload: &[u8]) -> Result<(), LinkError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            warn!("scmd send: payload of {} bytes too large", payload.len());
            return Err(LinkError::PayloadTooLarge);
        }

        self.write_header(command, target, payload.len() as u16)?;
        for (index, data) in payload.chunks(CHUNK_DATA_LEN).enumerate() {
            self.write_chunk(data).inspect_err(|_| {
                warn!("scmd send: chunk {} not acknowledged", index);
            })?;
        }

        trace!(
            "scmd sent cmd={} to={} len={}",
            command,
            target,
            payload.len()
        );
        Ok(())
    }

    /// Write a header and wait for its acknowledgment
    pub fn write_header(&mut self, command: u8, target: DeviceId, len: u16) -> Result<(), LinkError> {
        let header = Header::new(self.config.version, command, self.config.device_id, target, len);
        self.port.write_blocking(&header.encode()).map_err(transport)?;
        self.port.flush().map_err(transport)?;
        self.await_ack()
    }

    /// Write one chunk (up to 32 bytes of `data`) and wait for its acknowledgment
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.port
            .write_blocking(&chunk::encode_chunk(data))
            .map_err(transport)?;
        self.port.flush().map_err(transport)?;
        self.await_ack()
    }

    /// Emit an acknowledgment
    pub fn send_ack(&mut self) -> Result<(), LinkError> {
        ack::send_ack(&mut self.port).map_err(transport)
    }

    /// Wait for the peer's acknowledgment within the configured window
    pub fn await_ack(&mut self) -> Result<(), LinkError> {
        let wait = AckWait::new(self.config.ack_timeout_ms, self.config.ack_poll_interval_us);
        match ack::await_ack(&mut self.port, &mut self.clock, wait) {
            Ok(()) => Ok(()),
            Err(AckError::Timeout) => {
                debug!("scmd ack timeout after {} ms", self.config.ack_timeout_ms);
                Err(LinkError::BadAck)
            }
            Err(AckError::Mismatch(byte)) => {
                debug!("scmd ack mismatch: got {=u8:#x}", byte);
                Err(LinkError::BadAck)
            }
            Err(AckError::Transport(e)) => Err(transport(e)),
        }
    }

    /// Receive one message into `buf`
    ///
    /// On success the first [`Message::len`] bytes of `buf` hold the
    /// payload. Messages longer than `buf` are refused after the header
    /// has been acknowledged and before any chunk is read; the sender then
    /// times out on its first chunk.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<Message, LinkError> {
        let header = self.read_header()?;
        let len = header.length as usize;
        if len > buf.len() {
            warn!(
                "scmd receive: {} byte payload exceeds {} byte buffer",
                len,
                buf.len()
            );
            return Err(LinkError::BufferTooSmall);
        }

        for (index, dest) in buf[..len].chunks_mut(CHUNK_DATA_LEN).enumerate() {
            let data = self.read_chunk().inspect_err(|_| {
                warn!("scmd receive: chunk {} rejected", index);
            })?;
            dest.copy_from_slice(&data[..dest.len()]);
        }

        trace!(
            "scmd received cmd={} from={} len={}",
            header.command,
            header.sender,
            len
        );
        Ok(Message {
            command: header.command,
            sender: header.sender,
            len,
        })
    }

    /// Read and validate a header, acknowledging it if it is for us
    ///
    /// Headers that fail validation or target another endpoint are not
    /// acknowledged. Their bytes are consumed; any chunks the sender
    /// follows up with are left on the wire.
    pub fn read_header(&mut self) -> Result<Header, LinkError> {
        let mut bytes = [0u8; HEADER_LEN];
        self.read_unit(&mut bytes)?;

        let header = Header::decode(&bytes, self.config.version, self.config.device_id)
            .inspect_err(|e| debug!("scmd header rejected: {}", e))?;
        self.send_ack()?;
        Ok(header)
    }

    /// Read and validate one chunk, acknowledging it on success
    pub fn read_chunk(&mut self) -> Result<[u8; CHUNK_DATA_LEN], LinkError> {
        let mut bytes = [0u8; CHUNK_LEN];
        self.read_unit(&mut bytes)?;

        let data = chunk::decode_chunk(&bytes).inspect_err(|e| debug!("scmd chunk rejected: {}", e))?;
        self.send_ack()?;
        Ok(data)
    }

    /// Fill `buf` from the port or fail with `ShortRead`
    fn read_unit(&mut self, buf: &mut [u8]) -> Result<(), LinkError> {
        let n = self.port.read_blocking(buf).map_err(transport)?;
        if n != buf.len() {
            debug!("scmd short read: {} of {} bytes", n, buf.len());
            return Err(LinkError::ShortRead);
        }
        Ok(())
    }
}
