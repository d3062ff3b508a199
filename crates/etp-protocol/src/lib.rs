//! # ETP Protocol
//!
//! Shared data model for the Energistics Transfer Protocol (ETP) dispatch layer.
//!
//! A single ETP session multiplexes many *protocols* (Discovery, Store,
//! StoreNotification, GrowingObject, ChannelStreaming, ...), each played in one of
//! two complementary *roles*. Two wire generations exist, ETP 1.1 and ETP 1.2,
//! which share the same abstract capability set but differ in message shapes and
//! protocol numbering.
//!
//! This crate provides:
//!
//! - **Versions and roles**: [`WireVersion`], [`Role`]
//! - **Protocol identity**: [`ProtocolId`] (always scoped to a wire version),
//!   [`Etp11Protocol`], [`Etp12Protocol`], [`Capability`]
//! - **Protocol Role Catalog**: [`ProtocolCatalog`], [`ProtocolDescriptor`],
//!   [`ProtocolRoleRequest`]
//! - **Correlation contract**: [`MessageHeader`], [`MessageFlags`]
//! - **Domain records**: resources, data objects, channel metadata, parts
//! - **Message families**: [`messages::v11`], [`messages::v12`] and the
//!   version-neutral [`InboundMessage`]
//!
//! Byte-level encoding is owned by the session/transport layer and is not part
//! of this crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use etp_protocol::{Etp11Protocol, ProtocolCatalog, Role, WireVersion};
//!
//! let catalog = ProtocolCatalog::for_version(WireVersion::V11);
//! let requests = catalog.default_role_requests();
//!
//! let discovery = requests
//!     .iter()
//!     .find(|r| r.protocol == Etp11Protocol::Discovery.id() && r.role == Role::Store)
//!     .unwrap();
//! assert!(discovery.selected);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod header;
pub mod messages;
pub mod protocol;
pub mod role;
pub mod types;
pub mod version;

pub use catalog::{ProtocolCatalog, ProtocolDescriptor, ProtocolRoleRequest};
pub use error::{ProtocolError, ProtocolResult};
pub use header::{MessageFlags, MessageHeader};
pub use messages::{InboundMessage, MessageBody, MessageKind, OutboundMessage};
pub use protocol::{Capability, Etp11Protocol, Etp12Protocol, ProtocolId};
pub use role::Role;
pub use types::*;
pub use version::WireVersion;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
