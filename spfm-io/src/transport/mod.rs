//! Transport layer for I/O abstraction
//!
//! Everything that talks to the SPFM light goes through [`Transport`]: a
//! bounded readiness poll plus single-call read/write. The blocking helpers in
//! [`blocking`] build "wait until ready, then transfer" on top of it.

use crate::core::types::{Direction, Readiness};
use crate::error::Result;
use std::time::Duration;

pub mod blocking;
pub mod mock;
pub mod poll;
mod serial;

pub use blocking::{WaitPolicy, read_blocking, write_blocking};
pub use mock::MockTransport;
pub use poll::{DEFAULT_POLL_TIMEOUT, poll_fd};
pub use serial::{LINE_SPEED, SerialSession};

/// Transport trait for device communication
pub trait Transport: Send {
    /// Wait at most `timeout` for the link to become ready in `direction`
    ///
    /// Returns [`Readiness::Busy`] when nothing happened in the window.
    fn poll(&mut self, direction: Direction, timeout: Duration) -> Result<Readiness>;

    /// Read data into buffer with a single call, returns number of bytes read
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer with a single call, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;
}
