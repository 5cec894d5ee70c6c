//! YM2608 (OPNA) register map helpers and the silence/reset sequence

use crate::core::types::RegisterWrite;
use crate::error::Result;
use std::fmt;

// Register addresses
pub const REG_MODE: u8 = 0x29; // SCH/IRQ enable; bit 7 selects 6-channel OPNA mode
pub const REG_KEY_ON: u8 = 0x28;
pub const REG_PAN_FIRST: u8 = 0xB4;
pub const REG_PAN_LAST: u8 = 0xB6;
pub const REG_TOTAL_LEVEL_FIRST: u8 = 0x40;
pub const REG_TOTAL_LEVEL_LAST: u8 = 0x4E;
pub const REG_RELEASE_FIRST: u8 = 0x80;
pub const REG_RELEASE_LAST: u8 = 0x8E;
pub const REG_ADPCM_CONTROL1: u8 = 0x00; // Port 1
pub const REG_ADPCM_START_L: u8 = 0x02; // Port 1, 0x02-0x05 start/stop address
pub const REG_ADPCM_STOP_H: u8 = 0x05;
pub const REG_SSG_MIXER: u8 = 0x07;
pub const REG_SSG_LEVEL_A: u8 = 0x08;
pub const REG_SSG_LEVEL_C: u8 = 0x0A;

// Register values
const MODE_OPNA: u8 = 0x80;
const PAN_BOTH: u8 = 0xC0;
const TOTAL_LEVEL_MIN: u8 = 0x7F;
const RELEASE_FASTEST: u8 = 0x0F;
const ADPCM_RESET_STOP: u8 = 0xB0;
const SSG_ALL_OFF: u8 = 0x3F;
const FM_CHANNELS: u8 = 6;

/// Functional block an OPNA register belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterRegion {
    Ssg,
    Rhythm,
    FmCommon,
    /// FM channels 1-3 (port 0)
    FmLow,
    Adpcm,
    /// FM channels 4-6 (port 1)
    FmHigh,
    Unknown,
}

impl RegisterRegion {
    /// Classify a (port, address) pair
    pub fn classify(port: u8, address: u8) -> Self {
        if port == 0 {
            match address {
                0x00..=0x0F => RegisterRegion::Ssg,
                0x10..=0x1F => RegisterRegion::Rhythm,
                0x20..=0x2F => RegisterRegion::FmCommon,
                0x30..=0xB6 => RegisterRegion::FmLow,
                _ => RegisterRegion::Unknown,
            }
        } else {
            match address {
                0x00..=0x10 => RegisterRegion::Adpcm,
                0x30..=0xB6 => RegisterRegion::FmHigh,
                _ => RegisterRegion::Unknown,
            }
        }
    }
}

impl fmt::Display for RegisterRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegisterRegion::Ssg => "SSG",
            RegisterRegion::Rhythm => "RHYTHM",
            RegisterRegion::FmCommon => "FM COMMON",
            RegisterRegion::FmLow => "FM (1-3ch)",
            RegisterRegion::Adpcm => "ADPCM",
            RegisterRegion::FmHigh => "FM (4-6ch)",
            RegisterRegion::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Ordered register writes that silence an OPNA on `slot`
///
/// Mode select goes first: the port-1 FM registers only exist in 6-channel
/// mode. Per-channel output/level/release follow, then key-off, then the
/// ADPCM and SSG blocks.
pub fn reset_sequence(slot: u8) -> Result<Vec<RegisterWrite>> {
    let mut seq = Vec::with_capacity(82);
    let mut push = |port: u8, address: u8, data: u8| -> Result<()> {
        seq.push(RegisterWrite::new(slot, port, address, data)?);
        Ok(())
    };

    push(0, REG_MODE, MODE_OPNA)?;

    for port in 0..=1 {
        for address in REG_PAN_FIRST..=REG_PAN_LAST {
            push(port, address, PAN_BOTH)?;
        }
    }
    for address in REG_TOTAL_LEVEL_FIRST..=REG_TOTAL_LEVEL_LAST {
        push(0, address, TOTAL_LEVEL_MIN)?;
        push(1, address, TOTAL_LEVEL_MIN)?;
    }
    for address in REG_RELEASE_FIRST..=REG_RELEASE_LAST {
        push(0, address, RELEASE_FASTEST)?;
        push(1, address, RELEASE_FASTEST)?;
    }
    for channel in 0..FM_CHANNELS {
        push(0, REG_KEY_ON, channel)?;
    }

    for address in REG_ADPCM_START_L..=REG_ADPCM_STOP_H {
        push(1, address, 0x00)?;
    }
    push(1, REG_ADPCM_CONTROL1, ADPCM_RESET_STOP)?;

    push(0, REG_SSG_MIXER, SSG_ALL_OFF)?;
    for address in REG_SSG_LEVEL_A..=REG_SSG_LEVEL_C {
        push(0, address, 0x00)?;
    }

    Ok(seq)
}
