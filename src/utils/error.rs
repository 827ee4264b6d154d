//! Error handling for the EMS bridge
//!
//! A single error type covers the bridge; transport and session code converts
//! lower-level failures into these variants at the boundary where they occur.

use thiserror::Error;

/// Bridge error type
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input/Output operation errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Bus link establishment and framing errors
    #[error("Link error: {0}")]
    LinkError(String),

    /// Malformed telegram or record data
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Internal channel closed while the bridge is still running
    #[error("Channel error: {0}")]
    ChannelError(String),
}

/// Result type alias used throughout the bridge
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    pub fn link(msg: impl Into<String>) -> Self {
        BridgeError::LinkError(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        BridgeError::ProtocolError(msg.into())
    }
}
