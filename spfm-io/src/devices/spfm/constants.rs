//! Constants for the SPFM light wire protocol

// Control commands (bit 7 set)
pub const CMD_CHECK_INTERFACE: u8 = 0xFF; // Answered with "LT"
pub const CMD_RESET: u8 = 0xFE; // Answered with "OK"
pub const CMD_NOP: u8 = 0x80; // No response; used as settling padding

// Acknowledgements
pub const ACK_CHECK_INTERFACE: [u8; 2] = *b"LT";
pub const ACK_RESET: [u8; 2] = *b"OK";

// Register/data command byte (bit 7 clear)
pub const CMD_REGISTER_WRITE: u8 = 0x00; // Low nibble carries A0-A3
pub const CMD_SN76489_DATA: u8 = 0x20; // CS1 for SN76489 modules

// Field masks
pub const SLOT_MASK: u8 = 0x0F;
pub const PORT_MASK: u8 = 0x01;
pub const PORT_SHIFT: u8 = 1; // Logical port drives A1

// Frame sizes
pub const SETTLE_NOP_COUNT: usize = 13; // Latch time for the chip before the next frame
pub const REGISTER_HEADER_LEN: usize = 4; // slot, command, address, data
pub const REGISTER_FRAME_LEN: usize = REGISTER_HEADER_LEN + SETTLE_NOP_COUNT;
pub const SN76489_FRAME_LEN: usize = 6; // slot, command, data, 3 dummy bytes

// Handshake replies are read into a buffer of this size
pub const RESPONSE_BUFFER_SIZE: usize = 32;

// Slot the OPNA module sits in on a stock SPFM light
pub const OPNA_SLOT: u8 = 0x01;
