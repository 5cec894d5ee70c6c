//! SPFM light driver
//!
//! The SPFM light is a USB-serial carrier for up to two sound-chip modules
//! (slots 0 and 1). The host talks to it with fixed-size commands:
//!
//! | Direction | Bytes                                   | Meaning          |
//! |-----------|-----------------------------------------|------------------|
//! | →         | `0xFF`                                  | check interface  |
//! | ←         | `'L' 'T'`                               | interface ack    |
//! | →         | `0xFE`                                  | reset            |
//! | ←         | `'O' 'K'`                               | reset ack        |
//! | →         | `0x80`                                  | no-op / padding  |
//! | →         | `slot, port<<1, addr, data, 0x80 × 13`  | register write   |
//! | →         | `slot, 0x20, data, 0, 0, 0`             | SN76489 data     |
//!
//! There is no register read-back; only the handshake produces replies.
//!
//! # Usage
//!
//! ```no_run
//! use spfm_io::devices::spfm::{SpfmLight, constants::OPNA_SLOT};
//! use spfm_io::transport::SerialSession;
//!
//! let session = SerialSession::open("/dev/ttyUSB0")?;
//! let mut spfm = SpfmLight::new(session);
//! spfm.handshake()?;
//! spfm.chip_reset(OPNA_SLOT)?;
//! spfm.into_transport().close()?;
//! # Ok::<(), spfm_io::Error>(())
//! ```

pub mod constants;
pub mod frame;
pub mod handshake;
pub mod opna;

pub use handshake::{Handshake, HandshakeState, HandshakeStep};

use crate::core::cancel::CancelToken;
use crate::core::types::{RegisterWrite, validate_slot};
use crate::error::Result;
use crate::transport::{Transport, WaitPolicy, write_blocking};
use constants::CMD_NOP;
use frame::{RegisterFrame, Sn76489Frame};
use opna::RegisterRegion;

/// Protocol engine bound to one transport
///
/// Single writer: every operation takes `&mut self` and completes (or fails)
/// before returning.
pub struct SpfmLight<T: Transport> {
    transport: T,
    policy: WaitPolicy,
    cancel: CancelToken,
}

impl<T: Transport> SpfmLight<T> {
    /// Wrap a transport with the default wait policy (15ms polls, unbounded)
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: WaitPolicy::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the poll timeout / total wait bound
    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use `cancel` to abort waits (e.g. from a signal handler)
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Validate the link: check interface, then reset the control logic
    pub fn handshake(&mut self) -> Result<()> {
        log::info!("SPFM light: checking interface...");
        let mut handshake = Handshake::new();
        match handshake.run(&mut self.transport, &self.policy, &self.cancel) {
            Ok(()) => {
                log::info!("SPFM light: interface ready");
                Ok(())
            }
            Err(e) => {
                log::error!("SPFM light handshake failed: {}", e);
                Err(e)
            }
        }
    }

    /// Send a single no-op byte
    pub fn nop(&mut self) -> Result<()> {
        write_blocking(&mut self.transport, &[CMD_NOP], &self.policy, &self.cancel)
    }

    /// Write `data` to register `address` of address space `port` on `slot`
    pub fn send_register(&mut self, slot: u8, port: u8, address: u8, data: u8) -> Result<()> {
        let write = RegisterWrite::new(slot, port, address, data)?;
        self.write_register(&write)
    }

    /// Send an already validated register write as one 17-byte frame
    pub fn write_register(&mut self, write: &RegisterWrite) -> Result<()> {
        let frame = RegisterFrame::encode(write);
        write_blocking(
            &mut self.transport,
            frame.as_bytes(),
            &self.policy,
            &self.cancel,
        )?;

        log::debug!(
            "slot:0x{:02X} port:0x{:02X} addr:0x{:02X} data:0x{:02X} ({})",
            write.slot,
            write.port,
            write.address,
            write.data,
            RegisterRegion::classify(write.port, write.address)
        );
        Ok(())
    }

    /// Send one data byte to an SN76489 module
    pub fn send_psg(&mut self, slot: u8, data: u8) -> Result<()> {
        validate_slot(slot)?;
        let frame = Sn76489Frame::encode(slot, data);
        write_blocking(
            &mut self.transport,
            frame.as_bytes(),
            &self.policy,
            &self.cancel,
        )?;

        log::debug!("slot:0x{:02X} SN76489 data:0x{:02X}", slot, data);
        Ok(())
    }

    /// Silence the OPNA on `slot`
    ///
    /// Pure write traffic. The first failed write aborts the rest of the
    /// sequence, which can leave the chip partially reset.
    pub fn chip_reset(&mut self, slot: u8) -> Result<()> {
        let sequence = opna::reset_sequence(slot)?;
        log::info!(
            "Resetting OPNA on slot {} ({} register writes)",
            slot,
            sequence.len()
        );

        for write in &sequence {
            self.write_register(write)?;
        }

        log::info!("OPNA on slot {} reset", slot);
        Ok(())
    }

    /// Release the transport (e.g. to close a [`SerialSession`](crate::transport::SerialSession))
    pub fn into_transport(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::MockTransport;
    use std::time::Duration;

    fn driver() -> (SpfmLight<MockTransport>, MockTransport) {
        let mock = MockTransport::spfm_light();
        let spfm = SpfmLight::new(mock.clone()).with_policy(WaitPolicy {
            poll_timeout: Duration::from_millis(1),
            max_wait: Some(Duration::from_millis(50)),
        });
        (spfm, mock)
    }

    #[test]
    fn test_handshake_then_register_write() {
        let (mut spfm, mock) = driver();
        spfm.handshake().unwrap();
        mock.clear_written();

        spfm.send_register(1, 0, 0x29, 0x80).unwrap();

        let mut expected = vec![0x01, 0x00, 0x29, 0x80];
        expected.extend([0x80; 13]);
        assert_eq!(mock.get_writes(), vec![expected]);
    }

    #[test]
    fn test_port_one_sets_a1() {
        let (mut spfm, mock) = driver();
        spfm.send_register(0, 1, 0xB4, 0xC0).unwrap();
        assert_eq!(&mock.get_written()[..4], &[0x00, 0x02, 0xB4, 0xC0]);
    }

    #[test]
    fn test_invalid_slot_sends_nothing() {
        let (mut spfm, mock) = driver();
        assert!(matches!(
            spfm.send_register(3, 0, 0x29, 0x80),
            Err(Error::InvalidParameter(_))
        ));
        assert!(mock.get_written().is_empty());
    }

    #[test]
    fn test_chip_reset_frames() {
        let (mut spfm, mock) = driver();
        spfm.chip_reset(1).unwrap();

        let writes = mock.get_writes();
        assert_eq!(writes.len(), 82);
        assert!(writes.iter().all(|w| w.len() == 17 && w[0] == 0x01));

        // Mode select is the first frame on the wire
        assert_eq!(&writes[0][..4], &[0x01, 0x00, 0x29, 0x80]);
        // ... and SSG level C the last
        assert_eq!(&writes[81][..4], &[0x01, 0x00, 0x0A, 0x00]);
    }

    #[test]
    fn test_chip_reset_aborts_on_transport_failure() {
        let (mut spfm, mock) = driver();
        mock.fail_after_writes(10);

        let err = spfm.chip_reset(1).unwrap_err();
        assert!(err.is_transport());
        assert_eq!(mock.get_writes().len(), 10);
    }

    #[test]
    fn test_send_psg() {
        let (mut spfm, mock) = driver();
        spfm.send_psg(0, 0x9F).unwrap();
        assert_eq!(mock.get_written(), vec![0x00, 0x20, 0x9F, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_send_psg_rejects_missing_slot() {
        let (mut spfm, mock) = driver();
        assert!(matches!(
            spfm.send_psg(2, 0x9F),
            Err(Error::InvalidParameter(_))
        ));
        assert!(mock.get_written().is_empty());
    }

    #[test]
    fn test_nop() {
        let (mut spfm, mock) = driver();
        spfm.nop().unwrap();
        assert_eq!(mock.get_written(), vec![0x80]);
    }

    #[test]
    fn test_cancel_aborts_handshake() {
        let mock = MockTransport::new();
        let cancel = CancelToken::new();
        let mut spfm = SpfmLight::new(mock).with_cancel(cancel.clone());

        cancel.cancel();
        assert!(matches!(spfm.handshake(), Err(Error::Cancelled)));
    }
}
