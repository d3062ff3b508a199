//! Wire profiles: the per-version data the generic extender is parameterized by.
//!
//! A profile answers three questions for its wire generation:
//!
//! - which local capability an [`Operation`] needs ([`WireProfile::capability`]),
//! - how a version-neutral [`Request`] becomes an [`OutboundMessage`]
//!   ([`WireProfile::build`]), and
//! - which index kinds count as time ([`WireProfile::is_time_index`]).
//!
//! Role inversion, the no-op guard and registry bookkeeping live in the
//! extender and are written once for both generations.

mod v11;
mod v12;

pub use v11::Etp11;
pub use v12::Etp12;

use etp_protocol::{
    Capability, ChannelMetadataRecord, ChannelRange, DataObject, IndexMetadata, ObjectPart,
    OutboundMessage, PartsRange, ProtocolCatalog, StreamingChannelInfo, SubscriptionRecord,
    WireVersion,
};
use uuid::Uuid;

/// A uniform operation, as used for capability lookup and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operation {
    GetResources,
    FindResources,
    FindObjects,
    GetObject,
    PutObject,
    DeleteObject,
    NotificationRequest,
    CancelNotification,
    FindParts,
    GetPart,
    GetPartsByRange,
    PutPart,
    DeletePart,
    DeletePartsByRange,
    ChannelDescribe,
    ChannelStreamingStart,
    ChannelStreamingStop,
    ChannelRangeRequest,
    OpenChannelResponse,
}

impl Operation {
    /// Every uniform operation.
    pub const ALL: [Operation; 19] = [
        Self::GetResources,
        Self::FindResources,
        Self::FindObjects,
        Self::GetObject,
        Self::PutObject,
        Self::DeleteObject,
        Self::NotificationRequest,
        Self::CancelNotification,
        Self::FindParts,
        Self::GetPart,
        Self::GetPartsByRange,
        Self::PutPart,
        Self::DeletePart,
        Self::DeletePartsByRange,
        Self::ChannelDescribe,
        Self::ChannelStreamingStart,
        Self::ChannelStreamingStop,
        Self::ChannelRangeRequest,
        Self::OpenChannelResponse,
    ];
}

/// Version-neutral request payload handed to [`WireProfile::build`].
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Request {
    GetResources {
        uri: String,
    },
    FindResources {
        uri: String,
    },
    FindObjects {
        uri: String,
    },
    GetObject {
        uri: String,
    },
    PutObject {
        data_object: DataObject,
    },
    DeleteObject {
        uri: String,
    },
    NotificationRequest {
        record: SubscriptionRecord,
    },
    CancelNotification {
        request_id: Uuid,
    },
    FindParts {
        uri: String,
    },
    GetPart {
        uri: String,
        uid: String,
    },
    GetPartsByRange {
        uri: String,
        range: PartsRange,
    },
    PutPart {
        part: ObjectPart,
    },
    DeletePart {
        uri: String,
        uid: String,
    },
    DeletePartsByRange {
        uri: String,
        range: PartsRange,
    },
    ChannelDescribe {
        uris: Vec<String>,
    },
    ChannelStreamingStart {
        channels: Vec<StreamingChannelInfo>,
    },
    ChannelStreamingStop {
        channel_ids: Vec<i64>,
    },
    ChannelRangeRequest {
        range: ChannelRange,
    },
    OpenChannelResponse {
        correlation_id: i64,
        channels: Vec<ChannelMetadataRecord>,
    },
}

impl Request {
    /// Operation this request performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::GetResources { .. } => Operation::GetResources,
            Self::FindResources { .. } => Operation::FindResources,
            Self::FindObjects { .. } => Operation::FindObjects,
            Self::GetObject { .. } => Operation::GetObject,
            Self::PutObject { .. } => Operation::PutObject,
            Self::DeleteObject { .. } => Operation::DeleteObject,
            Self::NotificationRequest { .. } => Operation::NotificationRequest,
            Self::CancelNotification { .. } => Operation::CancelNotification,
            Self::FindParts { .. } => Operation::FindParts,
            Self::GetPart { .. } => Operation::GetPart,
            Self::GetPartsByRange { .. } => Operation::GetPartsByRange,
            Self::PutPart { .. } => Operation::PutPart,
            Self::DeletePart { .. } => Operation::DeletePart,
            Self::DeletePartsByRange { .. } => Operation::DeletePartsByRange,
            Self::ChannelDescribe { .. } => Operation::ChannelDescribe,
            Self::ChannelStreamingStart { .. } => Operation::ChannelStreamingStart,
            Self::ChannelStreamingStop { .. } => Operation::ChannelStreamingStop,
            Self::ChannelRangeRequest { .. } => Operation::ChannelRangeRequest,
            Self::OpenChannelResponse { .. } => Operation::OpenChannelResponse,
        }
    }
}

/// Per-version role table and message factory.
pub trait WireProfile: Send + Sync + 'static {
    /// Wire generation of this profile.
    const VERSION: WireVersion;

    /// Protocol Role Catalog for this generation.
    fn catalog() -> ProtocolCatalog {
        ProtocolCatalog::for_version(Self::VERSION)
    }

    /// Local capability `operation` requires, or `None` if this generation
    /// cannot express it.
    fn capability(operation: Operation) -> Option<Capability>;

    /// Whether `index` is a time axis in this generation.
    fn is_time_index(index: &IndexMetadata) -> bool;

    /// Build the wire message for `request`, or `None` if this generation
    /// cannot express it.
    fn build(request: Request) -> Option<OutboundMessage>;

    /// Build a `CloseSession` message.
    fn close_session(reason: String) -> OutboundMessage;
}
