//! Error types for spfm-io

use crate::core::types::Direction;
use crate::devices::spfm::HandshakeStep;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// spfm-io error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial device could not be opened (missing, busy, permission)
    #[error("Failed to open {path}: {source}")]
    Open {
        /// Device path that was requested
        path: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Terminal attribute get/set failed
    #[error("Terminal configuration failed ({step}): {source}")]
    Configuration {
        /// Which termios step failed
        step: &'static str,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Handshake acknowledgement mismatch
    #[error("Handshake failed at {step}: expected {expected:02X?}, received {received:02X?}")]
    Handshake {
        /// Step that was not acknowledged
        step: HandshakeStep,
        /// Acknowledgement the device should have sent
        expected: [u8; 2],
        /// Bytes actually received
        received: Vec<u8>,
    },

    /// Underlying read/write/poll call failed
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Device accepted fewer bytes than requested
    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite {
        /// Bytes accepted by the device
        written: usize,
        /// Bytes in the frame
        expected: usize,
    },

    /// Read returned end-of-file (device unplugged or peer closed)
    #[error("Device disconnected")]
    Disconnected,

    /// Device never became ready within the configured bound
    #[error("Timed out waiting for device to become {0}")]
    Timeout(Direction),

    /// Cancellation was requested while waiting on the device
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures of the link itself (I/O, short transfer, wait bound, cancel)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_)
                | Error::ShortWrite { .. }
                | Error::Disconnected
                | Error::Timeout(_)
                | Error::Cancelled
        )
    }
}
