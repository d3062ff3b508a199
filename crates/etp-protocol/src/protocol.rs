//! Protocol identity.
//!
//! A protocol number is only meaningful inside one wire generation: protocol
//! `7` is DataArray in ETP 1.1 and GrowingObjectNotification in ETP 1.2.
//! [`ProtocolId`] therefore always carries its [`WireVersion`], and two ids from
//! different generations never compare equal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::role::Role;
use crate::version::WireVersion;

/// A protocol number scoped to a wire generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolId {
    version: WireVersion,
    id: i32,
}

impl ProtocolId {
    /// Create an id from a raw protocol number.
    ///
    /// No validation is performed; use [`ProtocolId::checked`] when the number
    /// comes from untrusted input.
    #[must_use]
    pub const fn new(version: WireVersion, id: i32) -> Self {
        Self { version, id }
    }

    /// Create an id, rejecting numbers the generation does not define.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownProtocol`] if `id` is not a protocol of
    /// `version`.
    pub fn checked(version: WireVersion, id: i32) -> Result<Self, ProtocolError> {
        let known = match version {
            WireVersion::V11 => Etp11Protocol::from_id(id).is_some(),
            WireVersion::V12 => Etp12Protocol::from_id(id).is_some(),
        };
        if known {
            Ok(Self::new(version, id))
        } else {
            Err(ProtocolError::UnknownProtocol { version, id })
        }
    }

    /// Wire generation this id belongs to.
    #[must_use]
    pub const fn version(self) -> WireVersion {
        self.version
    }

    /// Raw protocol number as carried in the message header.
    #[must_use]
    pub const fn id(self) -> i32 {
        self.id
    }

    /// Human-readable protocol name, or `"Unknown"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self.version {
            WireVersion::V11 => Etp11Protocol::from_id(self.id).map_or("Unknown", |p| p.name()),
            WireVersion::V12 => Etp12Protocol::from_id(self.id).map_or("Unknown", |p| p.name()),
        }
    }

    /// Whether this is the Core protocol (number 0 in both generations).
    #[must_use]
    pub const fn is_core(self) -> bool {
        self.id == 0
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.id)
    }
}

/// ETP 1.1 protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Etp11Protocol {
    /// Session management
    Core = 0,
    /// Channel streaming
    ChannelStreaming = 1,
    /// Channel data frames (placeholder)
    ChannelDataFrame = 2,
    /// Resource discovery
    Discovery = 3,
    /// Object store
    Store = 4,
    /// Store change notifications
    StoreNotification = 5,
    /// Growing object parts
    GrowingObject = 6,
    /// Data arrays (placeholder)
    DataArray = 7,
    /// WITSML SOAP tunnelling (placeholder)
    WitsmlSoap = 8,
}

impl Etp11Protocol {
    const ALL: [Self; 9] = [
        Self::Core,
        Self::ChannelStreaming,
        Self::ChannelDataFrame,
        Self::Discovery,
        Self::Store,
        Self::StoreNotification,
        Self::GrowingObject,
        Self::DataArray,
        Self::WitsmlSoap,
    ];

    /// Look up a protocol by number.
    #[must_use]
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| *p as i32 == id)
    }

    /// Scoped protocol id.
    #[must_use]
    pub const fn id(self) -> ProtocolId {
        ProtocolId::new(WireVersion::V11, self as i32)
    }

    /// Protocol name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::ChannelStreaming => "ChannelStreaming",
            Self::ChannelDataFrame => "ChannelDataFrame",
            Self::Discovery => "Discovery",
            Self::Store => "Store",
            Self::StoreNotification => "StoreNotification",
            Self::GrowingObject => "GrowingObject",
            Self::DataArray => "DataArray",
            Self::WitsmlSoap => "WitsmlSoap",
        }
    }
}

impl From<Etp11Protocol> for ProtocolId {
    fn from(protocol: Etp11Protocol) -> Self {
        protocol.id()
    }
}

/// ETP 1.2 protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Etp12Protocol {
    /// Session management
    Core = 0,
    /// Simple channel streaming
    ChannelStreaming = 1,
    /// Channel data frames
    ChannelDataFrame = 2,
    /// Resource discovery
    Discovery = 3,
    /// Object store
    Store = 4,
    /// Store change notifications
    StoreNotification = 5,
    /// Growing object parts
    GrowingObject = 6,
    /// Growing object change notifications
    GrowingObjectNotification = 7,
    /// Data arrays
    DataArray = 9,
    /// Resource queries
    DiscoveryQuery = 13,
    /// Object queries
    StoreQuery = 14,
    /// Growing object part queries
    GrowingObjectQuery = 16,
    /// Store transactions
    Transaction = 18,
    /// Channel subscriptions
    ChannelSubscribe = 21,
    /// Channel data loading
    ChannelDataLoad = 22,
    /// Dataspace management
    Dataspace = 24,
    /// Supported data object types
    SupportedTypes = 25,
}

impl Etp12Protocol {
    const ALL: [Self; 17] = [
        Self::Core,
        Self::ChannelStreaming,
        Self::ChannelDataFrame,
        Self::Discovery,
        Self::Store,
        Self::StoreNotification,
        Self::GrowingObject,
        Self::GrowingObjectNotification,
        Self::DataArray,
        Self::DiscoveryQuery,
        Self::StoreQuery,
        Self::GrowingObjectQuery,
        Self::Transaction,
        Self::ChannelSubscribe,
        Self::ChannelDataLoad,
        Self::Dataspace,
        Self::SupportedTypes,
    ];

    /// Look up a protocol by number.
    #[must_use]
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| *p as i32 == id)
    }

    /// Scoped protocol id.
    #[must_use]
    pub const fn id(self) -> ProtocolId {
        ProtocolId::new(WireVersion::V12, self as i32)
    }

    /// Protocol name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::ChannelStreaming => "ChannelStreaming",
            Self::ChannelDataFrame => "ChannelDataFrame",
            Self::Discovery => "Discovery",
            Self::Store => "Store",
            Self::StoreNotification => "StoreNotification",
            Self::GrowingObject => "GrowingObject",
            Self::GrowingObjectNotification => "GrowingObjectNotification",
            Self::DataArray => "DataArray",
            Self::DiscoveryQuery => "DiscoveryQuery",
            Self::StoreQuery => "StoreQuery",
            Self::GrowingObjectQuery => "GrowingObjectQuery",
            Self::Transaction => "Transaction",
            Self::ChannelSubscribe => "ChannelSubscribe",
            Self::ChannelDataLoad => "ChannelDataLoad",
            Self::Dataspace => "Dataspace",
            Self::SupportedTypes => "SupportedTypes",
        }
    }
}

impl From<Etp12Protocol> for ProtocolId {
    fn from(protocol: Etp12Protocol) -> Self {
        protocol.id()
    }
}

/// A protocol/role pair a session can hold a handler for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    /// Protocol the handler serves
    pub protocol: ProtocolId,
    /// Role the local handler plays
    pub role: Role,
}

impl Capability {
    /// Create a capability.
    #[must_use]
    pub const fn new(protocol: ProtocolId, role: Role) -> Self {
        Self { protocol, role }
    }

    /// Capability for the Core protocol of `version`, client or server side.
    #[must_use]
    pub const fn core(version: WireVersion, is_client: bool) -> Self {
        let role = if is_client { Role::Client } else { Role::Server };
        Self::new(ProtocolId::new(version, 0), role)
    }

    /// The same protocol with the complementary role.
    #[must_use]
    pub const fn complement(self) -> Self {
        Self::new(self.protocol, self.role.complement())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.protocol.name(), self.role)
    }
}
