//! # emsbridge
//!
//! Bidirectional bridge between a Buderus EMS heating bus and a TCP control
//! port. Operators send line-oriented text commands; the bridge translates
//! them into EMS requests toward the boiler (UBA), room controller (RC) and
//! base controller (BC10), reassembles the fragmented binary replies and
//! streams formatted text back.
//!
//! The bus is half-duplex with strict pacing, so all outbound traffic runs
//! through a single dispatcher that keeps at least 100 ms between requests
//! to the same peer and at most one request in flight per session.

pub mod command;
pub mod config;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod transport;
pub mod utils;

pub use config::BridgeConfig;
pub use utils::{BridgeError, Result};
