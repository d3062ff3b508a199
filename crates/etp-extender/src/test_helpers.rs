//! Test utilities for etp-extender
//!
//! These helpers are public so downstream crates can exercise their own
//! extender wiring without a live transport.
//!
//! [`RecordingSession`] is an in-memory [`Session`] that records handler
//! registrations and outbound messages, assigns increasing message ids, and
//! delivers scripted inbound messages to whatever sinks the extender attached.
//! An optional responder produces replies synchronously from inside `send`,
//! which is the fastest a real transport could possibly answer.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use etp_protocol::{
    Capability, InboundMessage, MessageFlags, MessageHeader, OutboundMessage, Resource,
    WireVersion,
};
use parking_lot::Mutex;

use crate::error::{Result, SessionError};
use crate::session::{MessageSink, Session, SessionInfo};

/// Scripted reply generator: given a sent message (with its assigned id),
/// returns the inbound messages to deliver in order.
pub type Responder =
    Arc<dyn Fn(&OutboundMessage) -> Vec<(MessageHeader, InboundMessage)> + Send + Sync>;

/// In-memory session for tests.
pub struct RecordingSession {
    info: SessionInfo,
    registered: Mutex<HashSet<Capability>>,
    registrations: Mutex<Vec<Capability>>,
    sinks: Mutex<HashMap<Capability, Arc<dyn MessageSink>>>,
    sent: Mutex<Vec<OutboundMessage>>,
    next_id: AtomicI64,
    fail_sends: AtomicBool,
    responder: Mutex<Option<Responder>>,
}

impl std::fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("info", &self.info)
            .field("registrations", &*self.registrations.lock())
            .field("sent", &self.sent.lock().len())
            .finish()
    }
}

impl RecordingSession {
    /// Session with the given identity. The matching core capability is
    /// registered up front, as a real session does on connect.
    #[must_use]
    pub fn new(info: SessionInfo) -> Self {
        let core = Capability::core(info.wire_version, info.is_client);
        Self {
            info,
            registered: Mutex::new(HashSet::from([core])),
            registrations: Mutex::new(Vec::new()),
            sinks: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail_sends: AtomicBool::new(false),
            responder: Mutex::new(None),
        }
    }

    /// Client-side session.
    #[must_use]
    pub fn client(version: WireVersion) -> Self {
        Self::new(SessionInfo::client("etp-extender-tests", "0.0.0", version))
    }

    /// Server-side session.
    #[must_use]
    pub fn server(version: WireVersion) -> Self {
        Self::new(SessionInfo::server("etp-extender-tests", "0.0.0", version))
    }

    /// Make every subsequent `send` fail (or succeed again).
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Install a responder invoked for every successful send.
    pub fn set_responder<F>(&self, responder: F)
    where
        F: Fn(&OutboundMessage) -> Vec<(MessageHeader, InboundMessage)> + Send + Sync + 'static,
    {
        *self.responder.lock() = Some(Arc::new(responder));
    }

    /// Capabilities registered through [`Session::register_handler`], in order.
    #[must_use]
    pub fn registrations(&self) -> Vec<Capability> {
        self.registrations.lock().clone()
    }

    /// Capabilities with an attached sink.
    #[must_use]
    pub fn attached(&self) -> HashSet<Capability> {
        self.sinks.lock().keys().copied().collect()
    }

    /// Messages sent so far, with their assigned ids.
    #[must_use]
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }

    /// Number of messages sent so far.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// Deliver an inbound message to the sink attached for `header.protocol`.
    ///
    /// Returns `false` if no sink is attached for that protocol.
    pub fn deliver(&self, header: &MessageHeader, message: &InboundMessage) -> bool {
        let sink = self
            .sinks
            .lock()
            .iter()
            .find(|(capability, _)| capability.protocol.id() == header.protocol)
            .map(|(_, sink)| Arc::clone(sink));
        match sink {
            Some(sink) => {
                sink.deliver(header, message);
                true
            }
            None => false,
        }
    }
}

impl Session for RecordingSession {
    fn info(&self) -> &SessionInfo {
        &self.info
    }

    fn can_handle(&self, capability: &Capability) -> bool {
        self.registered.lock().contains(capability)
    }

    fn register_handler(&self, capability: Capability) -> Result<()> {
        if capability.protocol.version() != self.info.wire_version {
            return Err(SessionError::registration(
                capability,
                "wire version mismatch",
            ));
        }
        self.registered.lock().insert(capability);
        self.registrations.lock().push(capability);
        Ok(())
    }

    fn attach(&self, capability: Capability, sink: Arc<dyn MessageSink>) {
        self.sinks.lock().insert(capability, sink);
    }

    fn send(&self, mut message: OutboundMessage) -> Result<i64> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(SessionError::send("connection reset"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        message.header.message_id = id;
        self.sent.lock().push(message.clone());

        let responder = self.responder.lock().clone();
        if let Some(responder) = responder {
            for (header, inbound) in responder(&message) {
                self.deliver(&header, &inbound);
            }
        }
        Ok(id)
    }
}

// ========== Discovery fixtures ==========

/// Header of the single, final response to `request`.
#[must_use]
pub fn final_response(request: &OutboundMessage, message_type: i32) -> MessageHeader {
    MessageHeader::response(
        request.header.protocol,
        message_type,
        request.header.message_id,
        MessageFlags::MULTI_PART.with_final_part(),
    )
}

/// A `GetResourcesResponse` answering `request` with `resources`, one message
/// per resource as ETP 1.1 does. An empty list yields a single `NO_DATA`
/// final message.
#[must_use]
pub fn resources_response(
    request: &OutboundMessage,
    resources: Vec<Resource>,
) -> Vec<(MessageHeader, InboundMessage)> {
    let id = request.header.message_id;
    let protocol = request.header.protocol;
    if resources.is_empty() {
        let flags = MessageFlags::MULTI_PART.with_final_part().with_no_data();
        return vec![(
            MessageHeader::response(protocol, 2, id, flags),
            InboundMessage::GetResourcesResponse {
                resources: Vec::new(),
            },
        )];
    }
    let last = resources.len() - 1;
    resources
        .into_iter()
        .enumerate()
        .map(|(i, resource)| {
            let flags = if i == last {
                MessageFlags::MULTI_PART.with_final_part()
            } else {
                MessageFlags::MULTI_PART
            };
            (
                MessageHeader::response(protocol, 2, id, flags),
                InboundMessage::GetResourcesResponse {
                    resources: vec![resource],
                },
            )
        })
        .collect()
}

/// URI a `GetResources` request asks about, for either wire version.
#[must_use]
pub fn requested_uri(message: &OutboundMessage) -> Option<&str> {
    use etp_protocol::MessageBody;
    use etp_protocol::messages::{v11, v12};
    match &message.body {
        MessageBody::V11(v11::Message::GetResources { uri }) => Some(uri),
        MessageBody::V12(v12::Message::GetResources { context, .. }) => Some(&context.uri),
        _ => None,
    }
}
