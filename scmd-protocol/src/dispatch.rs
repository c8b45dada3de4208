//! Receive loop
//!
//! [`Dispatcher`] owns a [`Link`], one receive buffer and one handler.
//! Call [`Dispatcher::poll`] from the main loop: it returns immediately
//! when nothing is pending, otherwise it receives one whole message
//! (blocking for the duration) and hands it to the handler.

use scmd_hal::{Clock, Uart};

use crate::address::DeviceId;
use crate::diagnostics::{receive_failure_line, DiagnosticSink, NoDiagnostics};
use crate::error::LinkError;
use crate::link::Link;
use crate::MAX_PAYLOAD_LEN;

/// Application callback for delivered messages
///
/// The payload borrows the dispatcher's buffer, which the next poll
/// overwrites; copy out anything that must outlive the call.
pub trait CommandHandler {
    fn on_command(&mut self, command: u8, sender: DeviceId, payload: &[u8]);
}

impl<F> CommandHandler for F
where
    F: FnMut(u8, DeviceId, &[u8]),
{
    fn on_command(&mut self, command: u8, sender: DeviceId, payload: &[u8]) {
        self(command, sender, payload)
    }
}

/// What a single poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// No bytes pending
    Idle,
    /// A message was received and handed to the handler
    Delivered {
        command: u8,
        sender: DeviceId,
        len: usize,
    },
    /// Bytes were pending but no message could be received
    Dropped(LinkError),
}

/// Single-threaded receive loop for one endpoint
///
/// `N` is the receive buffer capacity; messages declaring a longer
/// payload are dropped with [`LinkError::BufferTooSmall`].
pub struct Dispatcher<P, C, H, D = NoDiagnostics, const N: usize = MAX_PAYLOAD_LEN> {
    link: Link<P, C>,
    handler: H,
    diagnostics: D,
    buffer: [u8; N],
}

impl<P, C, H> Dispatcher<P, C, H>
where
    P: Uart,
    C: Clock,
    H: CommandHandler,
{
    /// Dispatcher with a full-size buffer and no diagnostic output
    pub fn new(link: Link<P, C>, handler: H) -> Self {
        Self::with_diagnostics(link, handler, NoDiagnostics)
    }
}

impl<P, C, H, D, const N: usize> Dispatcher<P, C, H, D, N>
where
    P: Uart,
    C: Clock,
    H: CommandHandler,
    D: DiagnosticSink,
{
    pub fn with_diagnostics(link: Link<P, C>, handler: H, diagnostics: D) -> Self {
        Self {
            link,
            handler,
            diagnostics,
            buffer: [0u8; N],
        }
    }

    /// Replace the handler
    pub fn set_handler(&mut self, handler: H) {
        self.handler = handler;
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn link(&self) -> &Link<P, C> {
        &self.link
    }

    /// Borrow the link, e.g. to send a reply between polls
    pub fn link_mut(&mut self) -> &mut Link<P, C> {
        &mut self.link
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Release the link and handler
    pub fn into_parts(self) -> (Link<P, C>, H) {
        (self.link, self.handler)
    }

    /// Receive and dispatch at most one message
    pub fn poll(&mut self) -> PollOutcome {
        match self.link.bytes_available() {
            Ok(0) => return PollOutcome::Idle,
            Ok(_) => {}
            Err(e) => return self.drop_message(e),
        }

        match self.link.receive(&mut self.buffer) {
            Ok(msg) => {
                // receive() rejects anything longer than the buffer
                let payload = &self.buffer[..msg.len];
                self.handler.on_command(msg.command, msg.sender, payload);
                PollOutcome::Delivered {
                    command: msg.command,
                    sender: msg.sender,
                    len: msg.len,
                }
            }
            Err(e) => self.drop_message(e),
        }
    }

    fn drop_message(&mut self, error: LinkError) -> PollOutcome {
        debug!("scmd dispatch dropped message: {}", error);
        if self.diagnostics.enabled() {
            self.diagnostics.write_line(&receive_failure_line(error));
        }
        PollOutcome::Dropped(error)
    }
}
