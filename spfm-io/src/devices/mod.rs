//! Device implementations

pub mod spfm;
