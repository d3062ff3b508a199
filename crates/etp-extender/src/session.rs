//! The session seam.
//!
//! A [`Session`] owns the connection, serializes messages and raises one event
//! per inbound message. The extender only talks to it through this trait and
//! never owns it: it holds a [`Weak`](std::sync::Weak) reference so that a
//! reconnect can replace the session without the extender keeping the old one
//! alive.

use std::sync::Arc;

use etp_protocol::{Capability, InboundMessage, MessageHeader, OutboundMessage, WireVersion};

use crate::error::Result;

/// Identity of a session, as seen by the extender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Session id, empty until the session is opened
    pub session_id: String,
    /// Local application name
    pub application_name: String,
    /// Local application version
    pub application_version: String,
    /// Whether the local side initiated the connection
    pub is_client: bool,
    /// Negotiated wire version
    pub wire_version: WireVersion,
}

impl SessionInfo {
    /// Info for a client session.
    pub fn client(
        application_name: impl Into<String>,
        application_version: impl Into<String>,
        wire_version: WireVersion,
    ) -> Self {
        Self {
            session_id: String::new(),
            application_name: application_name.into(),
            application_version: application_version.into(),
            is_client: true,
            wire_version,
        }
    }

    /// Info for a server session.
    pub fn server(
        application_name: impl Into<String>,
        application_version: impl Into<String>,
        wire_version: WireVersion,
    ) -> Self {
        Self {
            is_client: false,
            ..Self::client(application_name, application_version, wire_version)
        }
    }
}

/// Receiver of inbound messages for one capability.
///
/// Sessions call [`deliver`](MessageSink::deliver) on their I/O thread, one
/// message at a time. Implementations must not block.
pub trait MessageSink: Send + Sync {
    /// Handle one inbound message.
    fn deliver(&self, header: &MessageHeader, message: &InboundMessage);
}

/// A live ETP session.
pub trait Session: Send + Sync {
    /// Identity of the session.
    fn info(&self) -> &SessionInfo;

    /// Whether a handler is registered for `capability`.
    fn can_handle(&self, capability: &Capability) -> bool;

    /// Register a handler for `capability`.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`](crate::SessionError) if the session refuses
    /// the capability.
    fn register_handler(&self, capability: Capability) -> Result<()>;

    /// Route inbound messages of `capability` to `sink`, replacing any
    /// previously attached sink.
    fn attach(&self, capability: Capability, sink: Arc<dyn MessageSink>);

    /// Send a message, returning the message id the session assigned.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`](crate::SessionError) if the transport fails.
    fn send(&self, message: OutboundMessage) -> Result<i64>;
}
