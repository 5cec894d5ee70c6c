//! PTY-backed stand-in for an SPFM light
//!
//! The test opens the slave side through `SerialSession`; a thread on the
//! master side plays the device, answering handshake commands and capturing
//! everything the host sends.

#![allow(dead_code)]

use spfm_io::core::types::{Direction, Readiness};
use spfm_io::transport::poll_fd;
use std::ffi::CStr;
use std::os::fd::{AsFd, AsRawFd, FromRawFd, OwnedFd};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub struct Pty {
    pub master: OwnedFd,
    /// Held open so the line settings persist and can be inspected
    pub slave: OwnedFd,
    pub path: String,
}

impl Pty {
    pub fn open() -> Self {
        unsafe {
            let mut master: libc::c_int = 0;
            let mut slave: libc::c_int = 0;
            let rc = libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null(),
                std::ptr::null(),
            );
            assert_eq!(rc, 0, "openpty failed");

            let mut buf: [libc::c_char; 256] = [0; 256];
            assert_eq!(libc::ttyname_r(slave, buf.as_mut_ptr(), buf.len()), 0);
            let path = CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned();

            Pty {
                master: OwnedFd::from_raw_fd(master),
                slave: OwnedFd::from_raw_fd(slave),
                path,
            }
        }
    }

    /// Current line settings seen from the slave side
    pub fn slave_attributes(&self) -> libc::termios {
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            assert_eq!(libc::tcgetattr(self.slave.as_raw_fd(), &mut termios), 0);
            termios
        }
    }

    /// Start the simulated device
    ///
    /// `replies` are consumed in order: when the next expected command byte
    /// arrives, its reply is written back. Capture stops after `expect` bytes
    /// or a 5s deadline.
    pub fn spawn_device(&self, replies: Vec<(u8, Vec<u8>)>, expect: usize) -> JoinHandle<Vec<u8>> {
        let master = self.master.try_clone().expect("dup master");
        thread::spawn(move || run_device(master, replies, expect))
    }
}

fn run_device(master: OwnedFd, replies: Vec<(u8, Vec<u8>)>, expect: usize) -> Vec<u8> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut pending = replies.into_iter().peekable();
    let mut captured = Vec::new();
    let mut buf = [0u8; 512];

    while captured.len() < expect && Instant::now() < deadline {
        match poll_fd(master.as_fd(), Direction::Read, Duration::from_millis(10)) {
            Ok(Readiness::Readable) => {}
            Ok(_) => continue,
            Err(_) => break,
        }

        let n = unsafe {
            libc::read(
                master.as_raw_fd(),
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
            )
        };
        if n <= 0 {
            break;
        }

        for &byte in &buf[..n as usize] {
            captured.push(byte);
            if pending.peek().is_some_and(|(cmd, _)| *cmd == byte)
                && let Some((_, reply)) = pending.next()
            {
                let written = unsafe {
                    libc::write(
                        master.as_raw_fd(),
                        reply.as_ptr() as *const libc::c_void,
                        reply.len(),
                    )
                };
                assert_eq!(written as usize, reply.len());
            }
        }
    }

    captured
}

/// Replies of a healthy SPFM light
pub fn healthy_replies() -> Vec<(u8, Vec<u8>)> {
    vec![(0xFF, b"LT".to_vec()), (0xFE, b"OK".to_vec())]
}

pub fn same_line(a: &libc::termios, b: &libc::termios) -> bool {
    a.c_iflag == b.c_iflag
        && a.c_oflag == b.c_oflag
        && a.c_cflag == b.c_cflag
        && a.c_lflag == b.c_lflag
        && a.c_cc == b.c_cc
}
