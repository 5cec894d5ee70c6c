//! Blocking-until-ready transfers built from bounded polls
//!
//! Each helper loops on [`Transport::poll`] until the wanted readiness is seen,
//! then issues exactly one read or write call. The loop checks the
//! [`CancelToken`] every iteration and stops once [`WaitPolicy::max_wait`]
//! (if any) has elapsed.

use super::Transport;
use super::poll::DEFAULT_POLL_TIMEOUT;
use crate::core::cancel::CancelToken;
use crate::core::types::{Direction, Readiness};
use crate::error::{Error, Result};
use std::io;
use std::time::{Duration, Instant};

/// How long and how often to wait for the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Upper bound for a single poll call
    pub poll_timeout: Duration,
    /// Total bound per transfer; `None` waits until ready or cancelled
    pub max_wait: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            max_wait: None,
        }
    }
}

/// Spin on bounded polls until `direction` is ready
pub fn wait_ready<T: Transport + ?Sized>(
    transport: &mut T,
    direction: Direction,
    policy: &WaitPolicy,
    cancel: &CancelToken,
) -> Result<()> {
    let started = Instant::now();
    let wanted = Readiness::for_direction(direction);

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if transport.poll(direction, policy.poll_timeout)? == wanted {
            return Ok(());
        }
        if let Some(limit) = policy.max_wait
            && started.elapsed() >= limit
        {
            return Err(Error::Timeout(direction));
        }
    }
}

/// Write `data` as one transfer once the link is writable
///
/// A partial write is fatal ([`Error::ShortWrite`]); the frame is never
/// silently truncated.
pub fn write_blocking<T: Transport + ?Sized>(
    transport: &mut T,
    data: &[u8],
    policy: &WaitPolicy,
    cancel: &CancelToken,
) -> Result<()> {
    loop {
        wait_ready(transport, Direction::Write, policy, cancel)?;

        match transport.write(data) {
            Ok(written) if written == data.len() => {
                log::trace!("TX {} byte(s): {:02X?}", written, data);
                return Ok(());
            }
            Ok(written) => {
                return Err(Error::ShortWrite {
                    written,
                    expected: data.len(),
                });
            }
            Err(Error::Transport(e)) if is_retryable(&e) => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Read at most `buffer.len()` bytes as one transfer once the link is readable
///
/// Returns the number of bytes read. End-of-file is [`Error::Disconnected`].
pub fn read_blocking<T: Transport + ?Sized>(
    transport: &mut T,
    buffer: &mut [u8],
    policy: &WaitPolicy,
    cancel: &CancelToken,
) -> Result<usize> {
    loop {
        wait_ready(transport, Direction::Read, policy, cancel)?;

        match transport.read(buffer) {
            Ok(0) => return Err(Error::Disconnected),
            Ok(n) => {
                log::trace!("RX {} byte(s): {:02X?}", n, &buffer[..n]);
                return Ok(n);
            }
            Err(Error::Transport(e)) if is_retryable(&e) => continue,
            Err(e) => return Err(e),
        }
    }
}

// Readiness raced with another consumer or a signal; go back to polling
fn is_retryable(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
