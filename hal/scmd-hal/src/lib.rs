//! SCMD Hardware Abstraction Layer
//!
//! This crate defines the traits the SCMD protocol engine needs from the
//! platform it runs on. Chip HALs (or host test rigs) implement them; the
//! protocol crate is written purely against these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (command handlers)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  scmd-protocol (link, dispatcher)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  scmd-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-io   │       │  host / mock  │
//! │  peripheral   │       │   transport   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial byte transport
//! - [`clock::Clock`] - Monotonic time plus blocking delay

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod io;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
#[cfg(feature = "std")]
pub use clock::StdClock;
pub use io::IoUart;
pub use uart::{ErrorType, Uart, UartConfig, UartRx, UartTx};
