//! spfm-io - Serial protocol engine for the SPFM light
//!
//! Drives an SPFM light FM-synthesizer interface over its raw 1.5 Mbaud
//! serial link: port setup and restore, the check/reset handshake, register
//! write framing, and the OPNA silence sequence.
//!
//! ## Layers
//!
//! - [`transport`]: tty session, bounded readiness poll, blocking transfers
//! - [`devices::spfm`]: handshake, frame encoding, chip reset
//! - [`core`]: readiness/register types and the cancellation token

pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use crate::core::{CancelToken, RegisterWrite};
pub use devices::spfm::SpfmLight;
pub use error::{Error, Result};
pub use transport::{SerialSession, Transport, WaitPolicy};
