//! Serial session for the SPFM light
//!
//! Opens the tty, captures the existing termios, and switches the line to raw
//! 8N1 at 1.5 Mbaud. The captured attributes are written back exactly once,
//! either by [`SerialSession::close`] or when the session is dropped, so every
//! exit path (handshake failure, I/O error, panic unwind) leaves the tty as it
//! was found.

use super::Transport;
use super::poll::poll_fd;
use crate::core::types::{Direction, Readiness};
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::time::Duration;

/// Fixed SPFM light line speed (1 500 000 baud)
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const LINE_SPEED: libc::speed_t = libc::B1500000;

#[cfg(not(any(target_os = "linux", target_os = "android")))]
compile_error!("the SPFM light needs the B1500000 termios speed, which is only defined on Linux");

/// Raw serial link to an SPFM light
pub struct SerialSession {
    file: File,
    /// Attributes captured at open; `None` once restored
    saved: Option<libc::termios>,
    path: String,
}

impl SerialSession {
    /// Open and configure a serial device
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyUSB0")
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with(path, |fd, termios| {
            set_attributes(fd, libc::TCSAFLUSH, termios)
        })
    }

    /// Open `path`, applying the raw line settings through `apply`
    ///
    /// Any failure after the original attributes were captured rolls them
    /// back (via `Drop`) and closes the descriptor before returning.
    fn open_with<F>(path: &str, apply: F) -> Result<Self>
    where
        F: FnOnce(BorrowedFd<'_>, &libc::termios) -> io::Result<()>,
    {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| Error::Open {
                path: path.to_string(),
                source,
            })?;

        // Nothing has been modified yet; on failure just close
        let saved = get_attributes(file.as_fd()).map_err(|source| Error::Configuration {
            step: "tcgetattr",
            source,
        })?;

        let session = SerialSession {
            file,
            saved: Some(saved),
            path: path.to_string(),
        };

        let raw = raw_line_settings(&saved).map_err(|source| Error::Configuration {
            step: "cfsetspeed",
            source,
        })?;
        apply(session.file.as_fd(), &raw).map_err(|source| Error::Configuration {
            step: "tcsetattr",
            source,
        })?;

        log::info!("Opened serial port: {} at 1500000 baud (raw 8N1)", path);
        Ok(session)
    }

    /// Device path this session was opened on
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Attributes captured before the line was reconfigured
    pub fn saved_attributes(&self) -> Option<&libc::termios> {
        self.saved.as_ref()
    }

    /// Current attributes of the line
    pub fn attributes(&self) -> Result<libc::termios> {
        get_attributes(self.file.as_fd()).map_err(|source| Error::Configuration {
            step: "tcgetattr",
            source,
        })
    }

    /// Restore the original attributes and release the descriptor
    pub fn close(mut self) -> Result<()> {
        let restored = self.restore();
        let path = std::mem::take(&mut self.path);
        drop(self);

        restored.map_err(|source| Error::Configuration {
            step: "tcsetattr (restore)",
            source,
        })?;
        log::info!("Closed serial port: {}", path);
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        match self.saved.take() {
            Some(saved) => set_attributes(self.file.as_fd(), libc::TCSAFLUSH, &saved),
            None => Ok(()),
        }
    }
}

impl Drop for SerialSession {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::warn!("Failed to restore terminal settings on {}: {}", self.path, e);
        }
    }
}

impl AsFd for SerialSession {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl Transport for SerialSession {
    fn poll(&mut self, direction: Direction, timeout: Duration) -> Result<Readiness> {
        poll_fd(self.file.as_fd(), direction, timeout)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        Ok(self.file.read(buffer)?)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(self.file.write(data)?)
    }
}

/// Derive the SPFM light line settings from the captured attributes
///
/// No input, output or line-discipline processing; 8 data bits, no parity,
/// one stop bit, no flow control; reads return once one byte is available.
fn raw_line_settings(saved: &libc::termios) -> io::Result<libc::termios> {
    let mut termios = *saved;

    termios.c_iflag = 0;
    termios.c_oflag = 0;
    termios.c_lflag = 0;
    termios.c_cflag = libc::CS8 | libc::CREAD | libc::CLOCAL;

    termios.c_cc[libc::VMIN] = 1;
    termios.c_cc[libc::VTIME] = 0;

    // SAFETY: `termios` is a valid, initialized struct owned by this frame
    unsafe {
        if libc::cfsetispeed(&mut termios, LINE_SPEED) != 0
            || libc::cfsetospeed(&mut termios, LINE_SPEED) != 0
        {
            return Err(io::Error::last_os_error());
        }
    }

    Ok(termios)
}

fn get_attributes(fd: BorrowedFd<'_>) -> io::Result<libc::termios> {
    // SAFETY: termios is plain data; tcgetattr fully initializes it on success
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd.as_raw_fd(), &mut termios) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(termios)
    }
}

fn set_attributes(
    fd: BorrowedFd<'_>,
    action: libc::c_int,
    termios: &libc::termios,
) -> io::Result<()> {
    // SAFETY: `termios` points to a valid struct for the duration of the call
    if unsafe { libc::tcsetattr(fd.as_raw_fd(), action, termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
