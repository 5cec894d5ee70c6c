//! Core types shared by the transport and device layers

pub mod cancel;
pub mod types;

pub use cancel::CancelToken;
pub use types::{Direction, Readiness, RegisterWrite};
