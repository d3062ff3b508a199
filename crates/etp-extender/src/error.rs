//! Error types for the extender crate.

use std::path::PathBuf;

use etp_protocol::{Capability, ProtocolError};
use thiserror::Error;

/// Result alias for session-facing operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised by a [`Session`](crate::Session) implementation.
///
/// The extender never creates these itself. Whatever the session returns is
/// handed back to the caller unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Session is closed or was dropped.
    #[error("session is closed")]
    Closed,

    /// Transport rejected an outbound message.
    #[error("failed to send message: {message}")]
    Send {
        /// Transport-supplied detail
        message: String,
    },

    /// Session refused to register a handler.
    #[error("failed to register handler for {capability}: {message}")]
    Registration {
        /// Capability that could not be registered
        capability: Capability,
        /// Session-supplied detail
        message: String,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Create a send error.
    pub fn send(message: impl Into<String>) -> Self {
        Self::Send {
            message: message.into(),
        }
    }

    /// Create a registration error.
    pub fn registration(capability: Capability, message: impl Into<String>) -> Self {
        Self::Registration {
            capability,
            message: message.into(),
        }
    }
}

/// Configuration error types
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Config file not found
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Unsupported file format
    #[error("unsupported configuration file format; use .toml, .yaml, .yml, or .json")]
    UnsupportedFormat,

    /// Configuration parsing error
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] config::ConfigError),

    /// Protocol selection names a pair the catalog does not list
    #[error("protocol {protocol} with role {role} is not in the ETP {version} catalog")]
    UnknownSelection {
        /// Wire version of the catalog
        version: etp_protocol::WireVersion,
        /// Raw protocol number
        protocol: i32,
        /// Requested peer role
        role: etp_protocol::Role,
    },

    /// Identifier could not be interpreted
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
