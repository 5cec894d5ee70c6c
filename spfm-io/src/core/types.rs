//! Plain data types for readiness and register writes

use crate::error::{Error, Result};
use std::fmt;

/// Which side of the descriptor a wait is interested in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => write!(f, "readable"),
            Direction::Write => write!(f, "writable"),
        }
    }
}

/// Outcome of a single bounded poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Nothing happened within the poll window
    Busy,
    Readable,
    Writable,
}

impl Readiness {
    /// The non-busy readiness that satisfies a wait in `direction`
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Read => Readiness::Readable,
            Direction::Write => Readiness::Writable,
        }
    }
}

/// Highest module slot on an SPFM light (two slots: 0 and 1)
pub const MAX_SLOT: u8 = 1;
/// Highest logical port (address space A = 0, B = 1)
pub const MAX_PORT: u8 = 1;

/// Reject slots the SPFM light does not have
pub fn validate_slot(slot: u8) -> Result<()> {
    if slot > MAX_SLOT {
        return Err(Error::InvalidParameter(format!(
            "slot {} out of range (0..={})",
            slot, MAX_SLOT
        )));
    }
    Ok(())
}

/// One logical register write destined for a module on the SPFM light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub slot: u8,
    pub port: u8,
    pub address: u8,
    pub data: u8,
}

impl RegisterWrite {
    /// Build a validated register write
    ///
    /// Slot and port are each limited to 0 or 1.
    pub fn new(slot: u8, port: u8, address: u8, data: u8) -> Result<Self> {
        validate_slot(slot)?;
        if port > MAX_PORT {
            return Err(Error::InvalidParameter(format!(
                "port {} out of range (0..={})",
                port, MAX_PORT
            )));
        }
        Ok(Self {
            slot,
            port,
            address,
            data,
        })
    }
}
