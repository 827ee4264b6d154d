//! Shared utilities

pub mod error;

pub use error::{BridgeError, Result};
