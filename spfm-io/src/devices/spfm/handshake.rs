//! Check-interface / reset exchange
//!
//! ```text
//! Start ──0xFF──▶ ProbeSent ──"LT"──▶ ProbeAcked ──0xFE──▶ ResetSent ──"OK"──▶ ResetAcked
//!                     │                                        │
//!                     └──────── anything else ──▶ Failed ◀─────┘
//! ```
//!
//! Each step is tried once. Retrying is up to the caller.

use super::constants::*;
use crate::core::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::transport::{Transport, WaitPolicy, read_blocking, write_blocking};
use std::fmt;

/// Handshake command/acknowledge pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Check interface (0xFF → "LT")
    Probe,
    /// Reset control logic (0xFE → "OK")
    Reset,
}

impl HandshakeStep {
    pub fn command(self) -> u8 {
        match self {
            HandshakeStep::Probe => CMD_CHECK_INTERFACE,
            HandshakeStep::Reset => CMD_RESET,
        }
    }

    pub fn expected_ack(self) -> [u8; 2] {
        match self {
            HandshakeStep::Probe => ACK_CHECK_INTERFACE,
            HandshakeStep::Reset => ACK_RESET,
        }
    }

    fn sent_state(self) -> HandshakeState {
        match self {
            HandshakeStep::Probe => HandshakeState::ProbeSent,
            HandshakeStep::Reset => HandshakeState::ResetSent,
        }
    }

    fn acked_state(self) -> HandshakeState {
        match self {
            HandshakeStep::Probe => HandshakeState::ProbeAcked,
            HandshakeStep::Reset => HandshakeState::ResetAcked,
        }
    }
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeStep::Probe => write!(f, "check interface (0xFF)"),
            HandshakeStep::Reset => write!(f, "reset (0xFE)"),
        }
    }
}

/// Progress of the exchange
///
/// `ResetAcked` is the only successful end state. `Failed` is entered on any
/// ack mismatch or transport error and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Nothing sent yet
    Start,
    /// 0xFF written, waiting for "LT"
    ProbeSent,
    /// Interface check acknowledged
    ProbeAcked,
    /// 0xFE written, waiting for "OK"
    ResetSent,
    /// Control logic reset; link is ready for register writes
    ResetAcked,
    Failed,
}

/// One-shot link validation run at session start
#[derive(Debug)]
pub struct Handshake {
    state: HandshakeState,
}

impl Handshake {
    /// Create a handshake in the `Start` state
    pub fn new() -> Self {
        Self {
            state: HandshakeState::Start,
        }
    }

    /// Current state; stays at the last reached state after `run` returns
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Run probe then reset; succeeds only if both are acknowledged exactly
    pub fn run<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        policy: &WaitPolicy,
        cancel: &CancelToken,
    ) -> Result<()> {
        if self.state != HandshakeState::Start {
            return Err(Error::InvalidParameter(format!(
                "handshake already run (state {:?})",
                self.state
            )));
        }

        let result = self
            .exchange(HandshakeStep::Probe, transport, policy, cancel)
            .and_then(|()| self.exchange(HandshakeStep::Reset, transport, policy, cancel));

        if result.is_err() {
            self.state = HandshakeState::Failed;
        }
        result
    }

    fn exchange<T: Transport + ?Sized>(
        &mut self,
        step: HandshakeStep,
        transport: &mut T,
        policy: &WaitPolicy,
        cancel: &CancelToken,
    ) -> Result<()> {
        write_blocking(transport, &[step.command()], policy, cancel)?;
        self.state = step.sent_state();

        let mut buf = [0u8; RESPONSE_BUFFER_SIZE];
        let n = read_blocking(transport, &mut buf, policy, cancel)?;
        let received = &buf[..n];

        let expected = step.expected_ack();
        if received.len() < expected.len() || received[..expected.len()] != expected {
            return Err(Error::Handshake {
                step,
                expected,
                received: received.to_vec(),
            });
        }

        log::debug!("Handshake: {} acknowledged", step);
        self.state = step.acked_state();
        Ok(())
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}
