//! # ETP Extender
//!
//! Role-aware protocol negotiation and message dispatch on top of an ETP
//! session.
//!
//! An application talks to an ETP peer through one [`ProtocolExtender`]. The
//! extender hides which wire version was negotiated and which protocols the
//! peer agreed to:
//!
//! - **Handler registration**: [`ProtocolExtender::register`] registers one
//!   local handler per selected [`ProtocolRoleRequest`](etp_protocol::ProtocolRoleRequest),
//!   inverting roles on client sessions, exactly once per extender
//! - **Uniform operations**: discovery, store, notification, growing-object
//!   and channel operations with identical signatures for ETP 1.1 and 1.2.
//!   Operations whose capability was not negotiated are silent no-ops
//! - **Callback routing**: inbound messages reach the application through a
//!   [`CallbackTable`] keyed by message kind
//! - **Subscription Registry**: outstanding notification subscriptions and
//!   streaming channels, cleared whenever the session (re)opens
//! - **Discovery traversal**: [`DiscoveryTraversal`] walks the resource
//!   hierarchy one bounded, cancellable round trip at a time
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use etp_extender::test_helpers::RecordingSession;
//! use etp_extender::{CallbackTable, Etp12Extender, ExtenderConfig, ProtocolExtender};
//! use etp_protocol::{MessageKind, WireVersion};
//!
//! let config = ExtenderConfig::builder().wire_version(WireVersion::V12).build();
//! let session = Arc::new(RecordingSession::new(config.session_info(true)));
//!
//! let extender = Etp12Extender::new(&session, config.role_requests().unwrap());
//! extender
//!     .register(CallbackTable::new().on(MessageKind::Object, |_, object| {
//!         println!("received {object:?}");
//!     }))
//!     .unwrap();
//!
//! extender.get_object("eml:///witsml20.Well(1)").unwrap();
//! assert_eq!(session.sent_count(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod callbacks;
pub mod config;
pub mod correlation;
pub mod error;
pub mod extender;
pub mod profile;
pub mod session;
pub mod subscriptions;
pub mod test_helpers;
pub mod traversal;

pub use callbacks::{Callback, CallbackTable};
pub use self::config::{ExtenderConfig, ExtenderConfigBuilder, ProtocolSelection, TraversalConfig};
pub use correlation::{RemoteError, ResponseCollector, ResponseGroup};
pub use error::{ConfigError, Result, SessionError};
pub use extender::{
    Etp11Extender, Etp12Extender, Extender, ProtocolExtender, RegistrationState,
};
pub use profile::{Etp11, Etp12, Operation, Request, WireProfile};
pub use session::{MessageSink, Session, SessionInfo};
pub use subscriptions::SubscriptionRegistry;
pub use traversal::{
    DiscoveryTraversal, Expansion, ResourceNode, TraversalReport, TraversalState,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
