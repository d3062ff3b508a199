//! Error types for the ETP data model.

use thiserror::Error;

use crate::version::WireVersion;

/// Result alias using [`ProtocolError`].
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while interpreting identifiers from strings or integers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProtocolError {
    /// Role name is not one of the ETP roles.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Wire version string is not a supported ETP generation.
    #[error("unknown ETP wire version: {0}")]
    UnknownVersion(String),

    /// Protocol number does not exist in the given wire version.
    #[error("protocol {id} is not defined in ETP {version}")]
    UnknownProtocol {
        /// Wire version the id was interpreted against
        version: WireVersion,
        /// Raw protocol number
        id: i32,
    },
}
