//! Protocol roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// The side of a protocol a party plays.
///
/// Every protocol has exactly two complementary roles. `Client`/`Server` are
/// used by the Core protocol only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Core protocol, initiating side
    Client,
    /// Core protocol, accepting side
    Server,
    /// Holds data and answers queries
    Store,
    /// Queries a store
    Customer,
    /// Emits channel data
    Producer,
    /// Receives channel data
    Consumer,
}

impl Role {
    /// All roles, Core roles first.
    pub const ALL: [Role; 6] = [
        Role::Client,
        Role::Server,
        Role::Store,
        Role::Customer,
        Role::Producer,
        Role::Consumer,
    ];

    /// The role the other party plays when this party plays `self`.
    ///
    /// ```rust
    /// use etp_protocol::Role;
    ///
    /// assert_eq!(Role::Producer.complement(), Role::Consumer);
    /// assert_eq!(Role::Customer.complement(), Role::Store);
    /// ```
    #[must_use]
    pub const fn complement(self) -> Self {
        match self {
            Self::Client => Self::Server,
            Self::Server => Self::Client,
            Self::Store => Self::Customer,
            Self::Customer => Self::Store,
            Self::Producer => Self::Consumer,
            Self::Consumer => Self::Producer,
        }
    }

    /// Lowercase wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
            Self::Store => "store",
            Self::Customer => "customer",
            Self::Producer => "producer",
            Self::Consumer => "consumer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProtocolError;

    /// Role names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ProtocolError::UnknownRole(trimmed.to_string()))
    }
}
