//! Error taxonomy for the relay.
//!
//! Only [`BridgeError::Read`] is recoverable: the acquisition loop drops the
//! current card and goes back to polling. Everything else ends the process.

use std::io;
use thiserror::Error;

/// Result alias used across the library.
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no timing-card reader found on any available serial port")]
    NoReaderFound,

    #[error("failed to open serial port {port}")]
    PortOpen {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("failed to enumerate serial ports")]
    Discovery(#[source] serialport::Error),

    #[error("card read failed: {reason}")]
    Read { reason: String },

    #[error("transport write failed")]
    Transport(#[source] io::Error),

    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid record: {reason}")]
    InvalidRecord { reason: String },
}

impl BridgeError {
    pub fn read<S: Into<String>>(reason: S) -> Self {
        BridgeError::Read {
            reason: reason.into(),
        }
    }

    pub fn invalid_config<S: Into<String>>(field: &'static str, reason: S) -> Self {
        BridgeError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Per-card failures the acquisition loop survives.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BridgeError::Read { .. })
    }
}
