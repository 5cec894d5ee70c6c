//! Fixed-size wire frames for SPFM light commands
//!
//! A register write is 4 bytes of header/payload followed by 13 no-op bytes.
//! The padding gives the target chip time to latch the value before the next
//! frame arrives, so the frame is always sent as a single write.
//!
//! ```text
//! byte 0   module slot (0x00 / 0x01)
//! byte 1   command: bit 7 clear, bits 0-3 = A0-A3 (port selects A1)
//! byte 2   register address
//! byte 3   register data
//! 4..17    0x80 x 13
//! ```

use super::constants::*;
use crate::core::types::RegisterWrite;

/// Encoded register write frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFrame {
    data: [u8; REGISTER_FRAME_LEN],
}

impl RegisterFrame {
    /// Encode a register write
    pub const fn encode(write: &RegisterWrite) -> Self {
        let mut data = [CMD_NOP; REGISTER_FRAME_LEN];
        data[0] = write.slot & SLOT_MASK;
        data[1] = CMD_REGISTER_WRITE | ((write.port & PORT_MASK) << PORT_SHIFT);
        data[2] = write.address;
        data[3] = write.data;
        Self { data }
    }

    /// Frame bytes for sending
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Encoded SN76489 data frame (CMD 0x20)
///
/// The three trailing zero bytes are dummies the interface expects after
/// each PSG write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sn76489Frame {
    data: [u8; SN76489_FRAME_LEN],
}

impl Sn76489Frame {
    /// Encode a single SN76489 data byte for `slot`
    pub const fn encode(slot: u8, value: u8) -> Self {
        Self {
            data: [slot & SLOT_MASK, CMD_SN76489_DATA, value, 0x00, 0x00, 0x00],
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_frame_layout() {
        for slot in 0..=1u8 {
            for port in 0..=1u8 {
                let write = RegisterWrite::new(slot, port, 0xB4, 0xC0).unwrap();
                let frame = RegisterFrame::encode(&write);
                let bytes = frame.as_bytes();

                assert_eq!(bytes.len(), 17);
                assert_eq!(bytes[0], slot & 0x0F);
                assert_eq!(bytes[1], port << 1);
                assert_eq!(bytes[2], 0xB4);
                assert_eq!(bytes[3], 0xC0);
                assert!(bytes[4..].iter().all(|&b| b == CMD_NOP));
            }
        }
    }

    #[test]
    fn test_opna_mode_frame_bytes() {
        let write = RegisterWrite::new(1, 0, 0x29, 0x80).unwrap();
        let frame = RegisterFrame::encode(&write);

        let mut expected = vec![0x01, 0x00, 0x29, 0x80];
        expected.extend(std::iter::repeat_n(0x80, 13));
        assert_eq!(frame.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_command_byte_has_bit7_clear() {
        let write = RegisterWrite::new(0, 1, 0x00, 0x00).unwrap();
        assert_eq!(RegisterFrame::encode(&write).as_bytes()[1] & 0x80, 0);
    }

    #[test]
    fn test_sn76489_frame() {
        let frame = Sn76489Frame::encode(0, 0x9F);
        assert_eq!(frame.as_bytes(), &[0x00, 0x20, 0x9F, 0x00, 0x00, 0x00]);
    }
}
