//! Message families.
//!
//! Outbound messages are version-specific ([`v11::Message`], [`v12::Message`])
//! because the two wire generations disagree on message shapes. Inbound
//! messages are delivered to the dispatch layer already lifted into the
//! version-neutral [`InboundMessage`], which is what application callbacks see.

pub mod v11;
pub mod v12;

use serde::{Deserialize, Serialize};

use crate::header::MessageHeader;
use crate::protocol::ProtocolId;
use crate::types::{
    ChannelMetadataRecord, DataItem, DataObject, ObjectChange, ObjectPart, OpenSessionInfo,
    Resource,
};
use crate::version::WireVersion;

/// Body of an outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageBody {
    /// ETP 1.1 message
    V11(v11::Message),
    /// ETP 1.2 message
    V12(v12::Message),
}

impl MessageBody {
    /// Wire version of the body.
    #[must_use]
    pub const fn version(&self) -> WireVersion {
        match self {
            Self::V11(_) => WireVersion::V11,
            Self::V12(_) => WireVersion::V12,
        }
    }

    /// Protocol the message belongs to.
    #[must_use]
    pub fn protocol(&self) -> ProtocolId {
        match self {
            Self::V11(m) => m.protocol().id(),
            Self::V12(m) => m.protocol().id(),
        }
    }

    /// Message type number within the protocol.
    #[must_use]
    pub const fn message_type(&self) -> i32 {
        match self {
            Self::V11(m) => m.message_type(),
            Self::V12(m) => m.message_type(),
        }
    }

    /// Message name, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::V11(m) => m.name(),
            Self::V12(m) => m.name(),
        }
    }
}

/// A message ready to be handed to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Header; `message_id` is assigned by the session
    pub header: MessageHeader,
    /// Version-specific body
    pub body: MessageBody,
}

impl OutboundMessage {
    /// Wrap a body in a request header derived from it.
    #[must_use]
    pub fn request(body: MessageBody) -> Self {
        let header = MessageHeader::request(body.protocol(), body.message_type());
        Self { header, body }
    }

    /// Wrap a body as the single, final response to `correlation_id`.
    #[must_use]
    pub fn response(body: MessageBody, correlation_id: i64) -> Self {
        let mut header = MessageHeader::request(body.protocol(), body.message_type());
        header.correlation_id = correlation_id;
        header.message_flags = crate::header::MessageFlags::FINAL_PART;
        Self { header, body }
    }
}

impl From<v11::Message> for OutboundMessage {
    fn from(message: v11::Message) -> Self {
        Self::request(MessageBody::V11(message))
    }
}

impl From<v12::Message> for OutboundMessage {
    fn from(message: v12::Message) -> Self {
        Self::request(MessageBody::V12(message))
    }
}

/// A version-neutral inbound message.
///
/// The session layer decodes wire messages of either generation into this
/// shape before handing them to the dispatch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Core: session established
    OpenSession(OpenSessionInfo),
    /// Core: peer is closing the session
    CloseSession {
        /// Reason given by the peer
        reason: String,
    },
    /// Any protocol: request acknowledged
    Acknowledge,
    /// Any protocol: peer-reported failure
    ProtocolException {
        /// ETP error code
        error_code: i32,
        /// Error text
        message: String,
    },
    /// Discovery: resources below the requested URI
    GetResourcesResponse {
        /// Resources carried by this message
        resources: Vec<Resource>,
    },
    /// DiscoveryQuery: query results
    FindResourcesResponse {
        /// Matching resources
        resources: Vec<Resource>,
        /// Sort order applied by the server
        server_sort_order: String,
    },
    /// StoreQuery: query results
    FindObjectsResponse {
        /// Matching objects
        data_objects: Vec<DataObject>,
    },
    /// Store: requested objects
    Object {
        /// Returned objects
        data_objects: Vec<DataObject>,
    },
    /// StoreNotification: object created or updated
    ObjectChanged(ObjectChange),
    /// StoreNotification: object deleted
    ObjectDeleted {
        /// Deleted object URI
        uri: String,
        /// Deletion time in microseconds since the epoch
        change_time: i64,
    },
    /// ChannelStreaming/ChannelSubscribe: channel descriptions
    ChannelMetadata {
        /// Described channels
        channels: Vec<ChannelMetadataRecord>,
    },
    /// ChannelStreaming/ChannelSubscribe: streamed values
    ChannelData {
        /// Data points
        data: Vec<DataItem>,
    },
    /// ChannelStreaming: channel status changed
    ChannelStatusChange {
        /// Channel id
        channel_id: i64,
        /// New status
        status: String,
    },
    /// ChannelStreaming/ChannelSubscribe: channel removed
    ChannelRemove {
        /// Channel id
        channel_id: i64,
        /// Removal reason
        reason: String,
    },
    /// GrowingObject/GrowingObjectQuery: object parts
    ObjectParts {
        /// Parent object URI
        uri: String,
        /// Returned parts
        parts: Vec<ObjectPart>,
    },
    /// ChannelDataLoad: peer asks the local store to open channels
    OpenChannels {
        /// Channel URIs to open
        uris: Vec<String>,
    },
}

impl InboundMessage {
    /// Dispatch key of this message.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::OpenSession(_) => MessageKind::OpenSession,
            Self::CloseSession { .. } => MessageKind::CloseSession,
            Self::Acknowledge => MessageKind::Acknowledge,
            Self::ProtocolException { .. } => MessageKind::ProtocolException,
            Self::GetResourcesResponse { .. } => MessageKind::GetResourcesResponse,
            Self::FindResourcesResponse { .. } => MessageKind::FindResourcesResponse,
            Self::FindObjectsResponse { .. } => MessageKind::FindObjectsResponse,
            Self::Object { .. } => MessageKind::Object,
            Self::ObjectChanged(_) => MessageKind::ObjectChanged,
            Self::ObjectDeleted { .. } => MessageKind::ObjectDeleted,
            Self::ChannelMetadata { .. } => MessageKind::ChannelMetadata,
            Self::ChannelData { .. } => MessageKind::ChannelData,
            Self::ChannelStatusChange { .. } => MessageKind::ChannelStatusChange,
            Self::ChannelRemove { .. } => MessageKind::ChannelRemove,
            Self::ObjectParts { .. } => MessageKind::ObjectParts,
            Self::OpenChannels { .. } => MessageKind::OpenChannels,
        }
    }
}

/// Dispatch key for [`InboundMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum MessageKind {
    OpenSession,
    CloseSession,
    Acknowledge,
    ProtocolException,
    GetResourcesResponse,
    FindResourcesResponse,
    FindObjectsResponse,
    Object,
    ObjectChanged,
    ObjectDeleted,
    ChannelMetadata,
    ChannelData,
    ChannelStatusChange,
    ChannelRemove,
    ObjectParts,
    OpenChannels,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Etp11Protocol, Etp12Protocol};

    #[test]
    fn test_request_header_follows_body() {
        let msg: OutboundMessage = v11::Message::GetResources {
            uri: "eml://".into(),
        }
        .into();
        assert_eq!(msg.header.protocol, Etp11Protocol::Discovery as i32);
        assert_eq!(msg.header.message_type, 1);
        assert!(msg.header.is_unsolicited());
        assert_eq!(msg.body.name(), "GetResources");
    }

    #[test]
    fn test_response_header_is_final() {
        let msg = OutboundMessage::response(
            MessageBody::V12(v12::Message::OpenChannelsResponse {
                channels: Vec::new(),
            }),
            17,
        );
        assert_eq!(msg.header.protocol, Etp12Protocol::ChannelDataLoad as i32);
        assert_eq!(msg.header.correlation(), Some(17));
        assert!(msg.header.completes_group());
    }

    #[test]
    fn test_inbound_kind_serde() {
        let msg = InboundMessage::ProtocolException {
            error_code: 5,
            message: "invalid state".into(),
        };
        assert_eq!(msg.kind(), MessageKind::ProtocolException);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "protocolException");
    }
}
