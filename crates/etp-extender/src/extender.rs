//! The protocol extender: handler registration and the uniform operation
//! surface.
//!
//! An [`Extender`] binds a list of [`ProtocolRoleRequest`]s to a [`Session`].
//! Registration runs once per extender and registers exactly one local
//! handler per selected request:
//!
//! - on a **client** session the request names the role the peer plays, so
//!   the complementary role is registered (`store` → customer handler,
//!   `producer` → consumer handler, and so on);
//! - on a **server** session the request names what the server itself
//!   supports, so the literal role is registered.
//!
//! Every uniform operation first checks the capability it needs. When that
//! capability was not negotiated the call is a silent no-op returning a
//! neutral value (`0` or `()`), so application code can drive the full
//! surface regardless of what a given connection agreed to.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use etp_extender::test_helpers::RecordingSession;
//! use etp_extender::{CallbackTable, Etp11Extender, ProtocolExtender};
//! use etp_protocol::{ProtocolCatalog, WireVersion};
//!
//! let session = Arc::new(RecordingSession::client(WireVersion::V11));
//! let requests = ProtocolCatalog::for_version(WireVersion::V11).default_role_requests();
//!
//! let extender = Etp11Extender::new(&session, requests);
//! extender.register(CallbackTable::new()).unwrap();
//!
//! let id = extender.get_resources("eml://").unwrap();
//! assert_ne!(id, 0);
//! // Not expressible in ETP 1.1: a silent no-op.
//! assert_eq!(extender.find_resources("eml://").unwrap(), 0);
//! ```

use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use etp_protocol::{
    Capability, ChannelMetadataRecord, ChannelRange, ChannelSelection, DataObject,
    InboundMessage, IndexMetadata, MessageHeader, ObjectPart, PartsRange, ProtocolDescriptor,
    ProtocolRoleRequest, StartIndex, StreamingChannelInfo, SubscriptionRecord, WireVersion,
};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::callbacks::CallbackTable;
use crate::error::Result;
use crate::profile::{Etp11, Etp12, Operation, Request, WireProfile};
use crate::session::{MessageSink, Session};
use crate::subscriptions::SubscriptionRegistry;

/// Extender over an ETP 1.1 session.
pub type Etp11Extender = Extender<Etp11>;

/// Extender over an ETP 1.2 session.
pub type Etp12Extender = Extender<Etp12>;

// ============================================================================
// Uniform surface
// ============================================================================

/// Version-independent operation surface.
///
/// Implemented by [`Extender<Etp11>`] and [`Extender<Etp12>`] so application
/// code can hold an `Arc<dyn ProtocolExtender>` regardless of wire version.
///
/// Every operation returns `Ok` with a neutral value when its capability was
/// not negotiated. Errors are transport failures raised by the session and
/// are returned unchanged.
pub trait ProtocolExtender: Send + Sync {
    /// Wire version of this extender.
    fn wire_version(&self) -> WireVersion;

    /// Merge `callbacks` into the callback table and, on the first call, run
    /// the handler registration pass.
    ///
    /// # Errors
    ///
    /// Returns the session's error if a handler registration is refused. The
    /// pass is retried on the next call.
    fn register(&self, callbacks: CallbackTable) -> Result<()>;

    /// Attach an observer that sees inbound messages after the application
    /// callbacks. Observers are kept apart from the callback table, so later
    /// `register` calls never replace them.
    fn observe(&self, observer: CallbackTable);

    /// Close the session through whichever core capability is registered.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn close_session(&self, reason: &str) -> Result<()>;

    /// Catalog rows for this wire version.
    fn get_protocol_items(&self) -> Box<dyn Iterator<Item = ProtocolDescriptor>>;

    /// Whether `index` is a time axis in this wire version.
    fn is_time_index(&self, index: &IndexMetadata) -> bool;

    /// Request channel metadata for `uris`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn channel_describe(&self, uris: Vec<String>) -> Result<()>;

    /// Start streaming the selected, described channels.
    ///
    /// The streaming channel list is rebuilt from `channels`; when none
    /// qualifies the list is cleared and nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns the session's send error; the channel list is then unchanged.
    fn channel_streaming_start(
        &self,
        channels: &[ChannelSelection],
        start_index: StartIndex,
    ) -> Result<()>;

    /// Stop streaming `channel_ids`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn channel_streaming_stop(&self, channel_ids: Vec<i64>) -> Result<()>;

    /// Request historical data for `channel_ids` between `start` and `end`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn channel_range_request(&self, channel_ids: Vec<i64>, start: i64, end: i64) -> Result<()>;

    /// Request the resources below `uri`. Returns the request's message id,
    /// or `0` when Discovery was not negotiated.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn get_resources(&self, uri: &str) -> Result<i64>;

    /// Query resources below `uri`. Returns the message id or `0`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn find_resources(&self, uri: &str) -> Result<i64>;

    /// Query data objects below `uri`. Returns the message id or `0`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn find_objects(&self, uri: &str) -> Result<i64>;

    /// Fetch the object at `uri`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn get_object(&self, uri: &str) -> Result<()>;

    /// Delete the object at `uri`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn delete_object(&self, uri: &str) -> Result<()>;

    /// Store `object`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn put_object(&self, object: DataObject) -> Result<()>;

    /// Subscribe to change notifications and record the subscription.
    ///
    /// # Errors
    ///
    /// Returns the session's send error; nothing is recorded then.
    fn notification_request(&self, record: SubscriptionRecord) -> Result<()>;

    /// Cancel the subscription `request_id`. No-op if it is unknown.
    ///
    /// # Errors
    ///
    /// Returns the session's send error; the record is kept then.
    fn cancel_notification(&self, request_id: Uuid) -> Result<()>;

    /// Query the parts of the growing object at `uri`. Returns the message id
    /// or `0`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn find_parts(&self, uri: &str) -> Result<i64>;

    /// Fetch part `uid` of the growing object at `uri`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn get_part(&self, uri: &str, uid: &str) -> Result<()>;

    /// Fetch the parts of `uri` within `range`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn get_parts_by_range(&self, uri: &str, range: PartsRange) -> Result<()>;

    /// Store `part`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn put_part(&self, part: ObjectPart) -> Result<()>;

    /// Delete part `uid` of the growing object at `uri`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn delete_part(&self, uri: &str, uid: &str) -> Result<()>;

    /// Delete the parts of `uri` within `range`.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn delete_parts_by_range(&self, uri: &str, range: PartsRange) -> Result<()>;

    /// Answer an `OpenChannels` request with the opened channels.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    fn open_channel_response(
        &self,
        request: &MessageHeader,
        channels: Vec<ChannelMetadataRecord>,
    ) -> Result<()>;

    /// Snapshot of the outstanding notification subscriptions.
    fn subscriptions(&self) -> Vec<SubscriptionRecord>;

    /// Snapshot of the channels of the last stream start.
    fn streaming_channels(&self) -> Vec<StreamingChannelInfo>;
}

// ============================================================================
// Inbound routing
// ============================================================================

/// Sink attached to every registered capability.
#[derive(Debug, Default)]
struct Router {
    callbacks: RwLock<CallbackTable>,
    observers: RwLock<Vec<CallbackTable>>,
    registry: Arc<Mutex<SubscriptionRegistry>>,
}

impl MessageSink for Router {
    fn deliver(&self, header: &MessageHeader, message: &InboundMessage) {
        trace!(
            protocol = header.protocol,
            message_type = header.message_type,
            correlation_id = header.correlation_id,
            kind = ?message.kind(),
            "Dispatching inbound message"
        );

        match message {
            InboundMessage::OpenSession(open) => {
                self.registry.lock().clear();
                info!(session_id = %open.session_id, "Session opened, subscription registry cleared");
            }
            InboundMessage::Acknowledge => {
                debug!(correlation_id = header.correlation_id, "Acknowledge received");
            }
            InboundMessage::ProtocolException {
                error_code,
                message,
            } => {
                warn!(
                    protocol = header.protocol,
                    correlation_id = header.correlation_id,
                    error_code,
                    %message,
                    "Protocol exception received"
                );
            }
            _ => {}
        }

        // Clone out of the locks so callbacks may call back into the extender.
        let kind = message.kind();
        let callback = self.callbacks.read().get(kind);
        if let Some(callback) = callback {
            callback(header, message);
        }
        let observers: Vec<_> = self
            .observers
            .read()
            .iter()
            .filter_map(|table| table.get(kind))
            .collect();
        for observer in observers {
            observer(header, message);
        }
    }
}

// ============================================================================
// Extender
// ============================================================================

/// Handler registration state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    /// No registration pass has succeeded yet
    Unregistered,
    /// Handlers are registered; later `register` calls only merge callbacks
    Registered,
}

struct ExtenderInner {
    session: Weak<dyn Session>,
    role_requests: Vec<ProtocolRoleRequest>,
    state: Mutex<RegistrationState>,
    router: Arc<Router>,
}

/// Protocol extender, generic over the wire profile.
///
/// Cheap to clone; clones share registration state, callbacks and the
/// subscription registry.
pub struct Extender<P: WireProfile> {
    inner: Arc<ExtenderInner>,
    _profile: PhantomData<fn() -> P>,
}

impl<P: WireProfile> Clone for Extender<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _profile: PhantomData,
        }
    }
}

impl<P: WireProfile> std::fmt::Debug for Extender<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extender")
            .field("wire_version", &P::VERSION)
            .field("role_requests", &self.inner.role_requests.len())
            .field("state", &*self.inner.state.lock())
            .finish()
    }
}

impl<P: WireProfile> Extender<P> {
    /// Create an extender over `session`.
    ///
    /// The extender holds only a weak reference; once the session is dropped
    /// every capability counts as absent.
    pub fn new<S: Session + 'static>(
        session: &Arc<S>,
        role_requests: Vec<ProtocolRoleRequest>,
    ) -> Self {
        let session: Weak<S> = Arc::downgrade(session);
        Self::from_weak(session, role_requests)
    }

    /// Create an extender from an already type-erased session reference.
    pub fn from_weak(session: Weak<dyn Session>, role_requests: Vec<ProtocolRoleRequest>) -> Self {
        Self {
            inner: Arc::new(ExtenderInner {
                session,
                role_requests,
                state: Mutex::new(RegistrationState::Unregistered),
                router: Arc::new(Router::default()),
            }),
            _profile: PhantomData,
        }
    }

    /// Current registration state.
    #[must_use]
    pub fn registration_state(&self) -> RegistrationState {
        *self.inner.state.lock()
    }

    /// Role requests this extender was built with.
    #[must_use]
    pub fn role_requests(&self) -> &[ProtocolRoleRequest] {
        &self.inner.role_requests
    }

    /// Whether the capability `operation` needs is registered on the session.
    #[must_use]
    pub fn supports(&self, operation: Operation) -> bool {
        self.guard(operation).is_some()
    }

    fn session(&self) -> Option<Arc<dyn Session>> {
        self.inner.session.upgrade()
    }

    /// Local capability for a role request: inverted on clients, literal on
    /// servers.
    fn local_capability(request: &ProtocolRoleRequest, is_client: bool) -> Capability {
        let requested = Capability::new(request.protocol, request.role);
        if is_client {
            requested.complement()
        } else {
            requested
        }
    }

    fn registration_pass(&self, session: &Arc<dyn Session>) -> Result<()> {
        let is_client = session.info().is_client;
        let sink: Arc<dyn MessageSink> = self.inner.router.clone();
        info!(
            wire_version = %P::VERSION,
            is_client,
            "Registering protocol handlers"
        );

        for request in self.inner.role_requests.iter().filter(|r| r.selected) {
            if request.protocol.version() != P::VERSION {
                warn!(
                    protocol = %request.protocol,
                    "Skipping role request from another wire version"
                );
                continue;
            }
            let capability = Self::local_capability(request, is_client);
            if !session.can_handle(&capability) {
                session.register_handler(capability)?;
                debug!(%capability, "Handler registered");
            }
            session.attach(capability, Arc::clone(&sink));
        }

        let core = Capability::core(P::VERSION, is_client);
        if session.can_handle(&core) {
            session.attach(core, Arc::clone(&sink));
            debug!(capability = %core, "Core handler attached");
        }
        Ok(())
    }

    /// Session and capability for `operation`, if both are available.
    fn guard(&self, operation: Operation) -> Option<(Arc<dyn Session>, Capability)> {
        let Some(capability) = P::capability(operation) else {
            trace!(?operation, wire_version = %P::VERSION, "Operation not expressible, skipped");
            return None;
        };
        let Some(session) = self.session() else {
            trace!(?operation, "Session dropped, skipped");
            return None;
        };
        if !session.can_handle(&capability) {
            trace!(?operation, %capability, "Capability not registered, skipped");
            return None;
        }
        Some((session, capability))
    }

    /// Build and send `request` if its capability is registered.
    ///
    /// Returns `None` when the call was skipped.
    fn forward(&self, request: Request) -> Result<Option<i64>> {
        let operation = request.operation();
        let Some((session, _)) = self.guard(operation) else {
            return Ok(None);
        };
        let Some(message) = P::build(request) else {
            return Ok(None);
        };
        trace!(?operation, message = message.body.name(), "Forwarding request");
        session.send(message).map(Some)
    }

    fn registry(&self) -> &Mutex<SubscriptionRegistry> {
        &self.inner.router.registry
    }
}

impl<P: WireProfile> ProtocolExtender for Extender<P> {
    fn wire_version(&self) -> WireVersion {
        P::VERSION
    }

    fn register(&self, callbacks: CallbackTable) -> Result<()> {
        self.inner.router.callbacks.write().merge(callbacks);

        let mut state = self.inner.state.lock();
        if *state == RegistrationState::Registered {
            debug!("Handlers already registered, callbacks updated");
            return Ok(());
        }
        let Some(session) = self.session() else {
            warn!("Session dropped before handler registration");
            return Ok(());
        };
        self.registration_pass(&session)?;
        *state = RegistrationState::Registered;
        Ok(())
    }

    fn observe(&self, observer: CallbackTable) {
        debug!(?observer, "Observer attached");
        self.inner.router.observers.write().push(observer);
    }

    fn close_session(&self, reason: &str) -> Result<()> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        let registered = [true, false]
            .into_iter()
            .map(|is_client| Capability::core(P::VERSION, is_client))
            .any(|core| session.can_handle(&core));
        if !registered {
            trace!("No core capability registered, close skipped");
            return Ok(());
        }
        info!(%reason, "Closing session");
        session.send(P::close_session(reason.to_string()))?;
        Ok(())
    }

    fn get_protocol_items(&self) -> Box<dyn Iterator<Item = ProtocolDescriptor>> {
        P::catalog().descriptors()
    }

    fn is_time_index(&self, index: &IndexMetadata) -> bool {
        P::is_time_index(index)
    }

    fn channel_describe(&self, uris: Vec<String>) -> Result<()> {
        self.forward(Request::ChannelDescribe { uris })?;
        Ok(())
    }

    fn channel_streaming_start(
        &self,
        channels: &[ChannelSelection],
        start_index: StartIndex,
    ) -> Result<()> {
        if self.guard(Operation::ChannelStreamingStart).is_none() {
            return Ok(());
        }

        let infos: Vec<StreamingChannelInfo> = channels
            .iter()
            .filter(|c| c.selected)
            .filter_map(|c| c.metadata.as_ref())
            .map(|metadata| StreamingChannelInfo {
                channel_id: metadata.channel_id,
                start_index,
                receive_change_notification: true,
            })
            .collect();

        if infos.is_empty() {
            debug!("No selected, described channels; nothing to stream");
            self.registry().lock().replace_channels(Vec::new());
            return Ok(());
        }

        self.forward(Request::ChannelStreamingStart {
            channels: infos.clone(),
        })?;
        self.registry().lock().replace_channels(infos);
        Ok(())
    }

    fn channel_streaming_stop(&self, channel_ids: Vec<i64>) -> Result<()> {
        self.forward(Request::ChannelStreamingStop { channel_ids })?;
        Ok(())
    }

    fn channel_range_request(&self, channel_ids: Vec<i64>, start: i64, end: i64) -> Result<()> {
        let range = ChannelRange {
            channel_ids,
            start_index: start,
            end_index: end,
        };
        self.forward(Request::ChannelRangeRequest { range })?;
        Ok(())
    }

    fn get_resources(&self, uri: &str) -> Result<i64> {
        let id = self.forward(Request::GetResources { uri: uri.into() })?;
        Ok(id.unwrap_or(0))
    }

    fn find_resources(&self, uri: &str) -> Result<i64> {
        let id = self.forward(Request::FindResources { uri: uri.into() })?;
        Ok(id.unwrap_or(0))
    }

    fn find_objects(&self, uri: &str) -> Result<i64> {
        let id = self.forward(Request::FindObjects { uri: uri.into() })?;
        Ok(id.unwrap_or(0))
    }

    fn get_object(&self, uri: &str) -> Result<()> {
        self.forward(Request::GetObject { uri: uri.into() })?;
        Ok(())
    }

    fn delete_object(&self, uri: &str) -> Result<()> {
        self.forward(Request::DeleteObject { uri: uri.into() })?;
        Ok(())
    }

    fn put_object(&self, object: DataObject) -> Result<()> {
        self.forward(Request::PutObject {
            data_object: object,
        })?;
        Ok(())
    }

    fn notification_request(&self, record: SubscriptionRecord) -> Result<()> {
        let sent = self.forward(Request::NotificationRequest {
            record: record.clone(),
        })?;
        if sent.is_some() {
            self.registry().lock().add_subscription(record);
        }
        Ok(())
    }

    fn cancel_notification(&self, request_id: Uuid) -> Result<()> {
        if self.registry().lock().subscription(request_id).is_none() {
            trace!(%request_id, "Unknown subscription, cancel skipped");
            return Ok(());
        }
        if self
            .forward(Request::CancelNotification { request_id })?
            .is_some()
        {
            self.registry().lock().remove_subscription(request_id);
        }
        Ok(())
    }

    fn find_parts(&self, uri: &str) -> Result<i64> {
        let id = self.forward(Request::FindParts { uri: uri.into() })?;
        Ok(id.unwrap_or(0))
    }

    fn get_part(&self, uri: &str, uid: &str) -> Result<()> {
        self.forward(Request::GetPart {
            uri: uri.into(),
            uid: uid.into(),
        })?;
        Ok(())
    }

    fn get_parts_by_range(&self, uri: &str, range: PartsRange) -> Result<()> {
        self.forward(Request::GetPartsByRange {
            uri: uri.into(),
            range,
        })?;
        Ok(())
    }

    fn put_part(&self, part: ObjectPart) -> Result<()> {
        self.forward(Request::PutPart { part })?;
        Ok(())
    }

    fn delete_part(&self, uri: &str, uid: &str) -> Result<()> {
        self.forward(Request::DeletePart {
            uri: uri.into(),
            uid: uid.into(),
        })?;
        Ok(())
    }

    fn delete_parts_by_range(&self, uri: &str, range: PartsRange) -> Result<()> {
        self.forward(Request::DeletePartsByRange {
            uri: uri.into(),
            range,
        })?;
        Ok(())
    }

    fn open_channel_response(
        &self,
        request: &MessageHeader,
        channels: Vec<ChannelMetadataRecord>,
    ) -> Result<()> {
        self.forward(Request::OpenChannelResponse {
            correlation_id: request.message_id,
            channels,
        })?;
        Ok(())
    }

    fn subscriptions(&self) -> Vec<SubscriptionRecord> {
        self.registry().lock().subscriptions().to_vec()
    }

    fn streaming_channels(&self) -> Vec<StreamingChannelInfo> {
        self.registry().lock().channels().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingSession;
    use etp_protocol::{Etp11Protocol, Etp12Protocol, MessageFlags, ProtocolCatalog, Role};

    fn request(protocol: impl Into<etp_protocol::ProtocolId>, role: Role) -> ProtocolRoleRequest {
        ProtocolRoleRequest {
            protocol: protocol.into(),
            role,
            selected: true,
            enabled: true,
        }
    }

    #[test]
    fn test_client_registers_complement() {
        let session = Arc::new(RecordingSession::client(WireVersion::V11));
        let extender = Etp11Extender::new(
            &session,
            vec![request(Etp11Protocol::ChannelStreaming, Role::Producer)],
        );
        extender.register(CallbackTable::new()).unwrap();
        assert_eq!(
            session.registrations(),
            vec![Capability::new(
                Etp11Protocol::ChannelStreaming.id(),
                Role::Consumer
            )]
        );
    }

    #[test]
    fn test_server_registers_literal_role() {
        let session = Arc::new(RecordingSession::server(WireVersion::V12));
        let extender = Etp12Extender::new(
            &session,
            vec![request(Etp12Protocol::Store, Role::Store)],
        );
        extender.register(CallbackTable::new()).unwrap();
        assert_eq!(
            session.registrations(),
            vec![Capability::new(Etp12Protocol::Store.id(), Role::Store)]
        );
    }

    #[test]
    fn test_unselected_and_foreign_requests_are_skipped() {
        let session = Arc::new(RecordingSession::client(WireVersion::V11));
        let mut unselected = request(Etp11Protocol::Store, Role::Store);
        unselected.selected = false;
        let extender = Etp11Extender::new(
            &session,
            vec![unselected, request(Etp12Protocol::Store, Role::Store)],
        );
        extender.register(CallbackTable::new()).unwrap();
        assert!(session.registrations().is_empty());
        assert_eq!(extender.registration_state(), RegistrationState::Registered);
    }

    #[test]
    fn test_dropped_session_makes_everything_a_no_op() {
        let session = Arc::new(RecordingSession::client(WireVersion::V11));
        let requests = ProtocolCatalog::for_version(WireVersion::V11).default_role_requests();
        let extender = Etp11Extender::new(&session, requests);
        extender.register(CallbackTable::new()).unwrap();
        drop(session);
        assert_eq!(extender.get_resources("eml://").unwrap(), 0);
        extender.close_session("bye").unwrap();
    }

    #[test]
    fn test_open_session_clears_before_callback() {
        let session = Arc::new(RecordingSession::client(WireVersion::V11));
        let requests = ProtocolCatalog::for_version(WireVersion::V11).default_role_requests();
        let extender = Etp11Extender::new(&session, requests);

        let observed = Arc::new(Mutex::new(None));
        let probe = extender.clone();
        let seen = Arc::clone(&observed);
        extender
            .register(CallbackTable::new().on(
                etp_protocol::MessageKind::OpenSession,
                move |_, _| {
                    *seen.lock() = Some(probe.subscriptions().len());
                },
            ))
            .unwrap();

        extender
            .notification_request(SubscriptionRecord {
                request_id: Uuid::new_v4(),
                uri: "eml://".into(),
                start_time: chrono::Utc::now(),
                include_object_data: false,
                content_types: Default::default(),
            })
            .unwrap();
        assert_eq!(extender.subscriptions().len(), 1);

        let header = MessageHeader::response(0, 2, 0, MessageFlags::NONE);
        session.deliver(&header, &InboundMessage::OpenSession(Default::default()));
        assert_eq!(*observed.lock(), Some(0));
    }
}
