//! Bounded, level-triggered readiness check on a raw descriptor

use crate::core::types::{Direction, Readiness};
use crate::error::Result;
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};
use std::time::Duration;

/// Poll window used by the SPFM light tooling (15ms)
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(15);

/// Poll `fd` once for read and write interest, reporting only `direction`
///
/// Never blocks longer than `timeout`. Error and hang-up conditions count as
/// ready so the following read/write call surfaces the failure instead of the
/// caller spinning forever. An interrupted poll reports `Busy`.
pub fn poll_fd(fd: BorrowedFd<'_>, direction: Direction, timeout: Duration) -> Result<Readiness> {
    let mut pfd = libc::pollfd {
        fd: fd.as_raw_fd(),
        events: libc::POLLIN | libc::POLLOUT,
        revents: 0,
    };

    // Round up so sub-millisecond windows still wait instead of degrading to a spin
    let timeout_ms = timeout.as_micros().div_ceil(1000).min(libc::c_int::MAX as u128) as libc::c_int;

    // SAFETY: `pfd` is a single valid pollfd that outlives the call
    let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
    if rc < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(Readiness::Busy);
        }
        return Err(err.into());
    }
    if rc == 0 {
        return Ok(Readiness::Busy);
    }

    let wanted = match direction {
        Direction::Read => libc::POLLIN,
        Direction::Write => libc::POLLOUT,
    };
    let faulted = pfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0;

    if pfd.revents & wanted != 0 || faulted {
        Ok(Readiness::for_direction(direction))
    } else {
        Ok(Readiness::Busy)
    }
}
