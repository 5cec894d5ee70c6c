//! Mock transport for testing
//!
//! Behaves like an SPFM light that is always writable: every written byte is
//! recorded, and single-byte commands registered with
//! [`MockTransport::respond_to`] queue a reply that the next read returns.
//! Poll calls never sleep.

use super::Transport;
use crate::core::types::{Direction, Readiness};
use crate::error::Result;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Mock transport for unit testing
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    /// Individual write calls, in order
    writes: Vec<Vec<u8>>,
    responses: HashMap<u8, Vec<u8>>,
    writable: bool,
    max_write: Option<usize>,
    fail_writes: bool,
    fail_after: Option<usize>,
    fail_reads: bool,
    /// Peer closed: reads return 0 once the buffer is drained
    eof: bool,
    /// Next read reports `WouldBlock` instead of returning data
    spurious_wakeup: bool,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                read_buffer: VecDeque::new(),
                write_buffer: Vec::new(),
                writes: Vec::new(),
                responses: HashMap::new(),
                writable: true,
                max_write: None,
                fail_writes: false,
                fail_after: None,
                fail_reads: false,
                eof: false,
                spurious_wakeup: false,
            })),
        }
    }

    /// Mock that answers the SPFM light handshake correctly
    pub fn spfm_light() -> Self {
        let mock = Self::new();
        mock.respond_to(0xFF, b"LT");
        mock.respond_to(0xFE, b"OK");
        mock
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        self.lock().read_buffer.extend(data);
    }

    /// Queue `reply` whenever the single-byte command `command` is written
    pub fn respond_to(&self, command: u8, reply: &[u8]) {
        self.lock().responses.insert(command, reply.to_vec());
    }

    /// Get all written data
    pub fn get_written(&self) -> Vec<u8> {
        self.lock().write_buffer.clone()
    }

    /// Get written data split by write call
    pub fn get_writes(&self) -> Vec<Vec<u8>> {
        self.lock().writes.clone()
    }

    /// Clear written data
    pub fn clear_written(&self) {
        let mut inner = self.lock();
        inner.write_buffer.clear();
        inner.writes.clear();
    }

    /// Make the link report (or stop reporting) write readiness
    pub fn set_writable(&self, writable: bool) {
        self.lock().writable = writable;
    }

    /// Accept at most `limit` bytes per write call
    pub fn set_max_write(&self, limit: Option<usize>) {
        self.lock().max_write = limit;
    }

    /// Fail every write with a broken-pipe error
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Accept `count` more write calls, then fail the rest
    pub fn fail_after_writes(&self, count: usize) {
        self.lock().fail_after = Some(count);
    }

    /// Fail every read with an I/O error, as an unplugged adapter does
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Close the device side: the link turns readable and reads return 0
    pub fn inject_eof(&self) {
        self.lock().eof = true;
    }

    /// Make the next read report `WouldBlock` despite a readable poll
    pub fn inject_would_block(&self) {
        self.lock().spurious_wakeup = true;
    }
}

impl Transport for MockTransport {
    fn poll(&mut self, direction: Direction, _timeout: Duration) -> Result<Readiness> {
        let inner = self.lock();
        let ready = match direction {
            Direction::Read => !inner.read_buffer.is_empty() || inner.eof || inner.fail_reads,
            Direction::Write => inner.writable,
        };
        Ok(if ready {
            Readiness::for_direction(direction)
        } else {
            Readiness::Busy
        })
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.lock();

        if inner.fail_reads {
            return Err(io::Error::other("mock read failure").into());
        }
        if inner.spurious_wakeup {
            inner.spurious_wakeup = false;
            return Err(io::Error::from(io::ErrorKind::WouldBlock).into());
        }

        let available = inner.read_buffer.len().min(buffer.len());

        for (slot, byte) in buffer.iter_mut().zip(inner.read_buffer.drain(..available)) {
            *slot = byte;
        }

        Ok(available)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut inner = self.lock();

        let exhausted = match inner.fail_after.as_mut() {
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        };
        if inner.fail_writes || exhausted {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock device unplugged").into());
        }

        let accepted = inner.max_write.map_or(data.len(), |max| max.min(data.len()));
        inner.write_buffer.extend_from_slice(&data[..accepted]);
        inner.writes.push(data[..accepted].to_vec());

        if let [command] = data
            && let Some(reply) = inner.responses.get(command).cloned()
        {
            inner.read_buffer.extend(reply);
        }

        Ok(accepted)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_reply_is_queued() {
        let mut mock = MockTransport::spfm_light();
        assert_eq!(
            mock.poll(Direction::Read, Duration::ZERO).unwrap(),
            Readiness::Busy
        );

        mock.write(&[0xFF]).unwrap();
        assert_eq!(
            mock.poll(Direction::Read, Duration::ZERO).unwrap(),
            Readiness::Readable
        );

        let mut buf = [0u8; 8];
        let n = mock.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"LT");
    }

    #[test]
    fn test_eof_reads_zero() {
        let mut mock = MockTransport::new();
        mock.inject_eof();

        assert_eq!(
            mock.poll(Direction::Read, Duration::ZERO).unwrap(),
            Readiness::Readable
        );
        let mut buf = [0u8; 4];
        assert_eq!(mock.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_fail_after_writes() {
        let mut mock = MockTransport::new();
        mock.fail_after_writes(1);

        assert!(mock.write(&[1]).is_ok());
        assert!(mock.write(&[2]).is_err());
        assert_eq!(mock.get_writes(), vec![vec![1]]);
    }
}
