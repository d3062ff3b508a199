//! ETP 1.2 outbound messages.
//!
//! ETP 1.2 batches most requests into maps keyed by an arbitrary request-local
//! string; the dispatch layer always sends single-entry maps keyed `"0"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::protocol::Etp12Protocol;
use crate::types::{ChannelMetadataRecord, DataObject, ObjectPart};

/// Depth of a discovery request relative to its context URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextScopeKind {
    /// The context node itself
    #[serde(rename = "self")]
    SelfOnly,
    /// Sources of the context node
    Sources,
    /// Targets of the context node
    #[default]
    Targets,
    /// Sources, including the node itself
    SourcesOrSelf,
    /// Targets, including the node itself
    TargetsOrSelf,
}

/// Discovery context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    /// Starting URI
    pub uri: String,
    /// Levels to descend
    pub depth: i32,
    /// Restrict to these data object types, empty for all
    #[serde(default)]
    pub data_object_types: Vec<String>,
    /// Whether secondary relationships are followed
    #[serde(default)]
    pub navigable_edges: String,
}

impl ContextInfo {
    /// A one-level context rooted at `uri`.
    pub fn one_level(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            depth: 1,
            data_object_types: Vec::new(),
            navigable_edges: "Primary".into(),
        }
    }
}

/// Index interval for range requests on growing objects and channels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInterval {
    /// Interval start, `None` for open
    pub start_index: Option<f64>,
    /// Interval end, `None` for open
    pub end_index: Option<f64>,
    /// Unit of measure
    pub uom: String,
    /// Depth datum
    pub depth_datum: String,
}

/// One subscription of a `SubscribeNotifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    /// Subscribed context
    pub context: ContextInfo,
    /// Scope relative to the context
    pub scope: ContextScopeKind,
    /// Subscription uuid
    pub request_uuid: Uuid,
    /// Whether notifications carry object data
    pub include_object_data: bool,
    /// Format of the object data
    pub format: String,
}

/// ETP 1.2 channel start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChannelStartIndex {
    /// Latest `n` values
    RequestLatestIndexCount(i32),
    /// Explicit index value
    StartIndex(i64),
    /// From the beginning of the channel
    Beginning,
}

/// One channel of a `SubscribeChannels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSubscribeInfo {
    /// Channel id
    pub channel_id: i64,
    /// Start position
    pub start_index: ChannelStartIndex,
    /// Whether the producer should also send range data
    pub data_changes: bool,
}

/// One range of a `GetRanges`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRangeInfo {
    /// Channel ids
    pub channel_ids: Vec<i64>,
    /// Requested interval
    pub interval: IndexInterval,
}

/// One channel of an `OpenChannelsResponse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenChannelInfo {
    /// Channel metadata
    pub metadata: ChannelMetadataRecord,
    /// Whether the channel was already open
    pub preexisting: bool,
}

/// ETP 1.2 message sent by the dispatch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message", rename_all = "PascalCase")]
#[allow(missing_docs)]
pub enum Message {
    // Core
    CloseSession {
        reason: String,
    },

    // Discovery
    GetResources {
        context: ContextInfo,
        scope: ContextScopeKind,
        count_objects: bool,
    },

    // DiscoveryQuery
    FindResources {
        context: ContextInfo,
        scope: ContextScopeKind,
    },

    // StoreQuery
    FindDataObjects {
        context: ContextInfo,
        scope: ContextScopeKind,
        format: String,
    },

    // Store
    GetDataObjects {
        uris: BTreeMap<String, String>,
        format: String,
    },
    PutDataObjects {
        data_objects: BTreeMap<String, DataObject>,
    },
    DeleteDataObjects {
        uris: BTreeMap<String, String>,
    },

    // StoreNotification
    SubscribeNotifications {
        request: BTreeMap<String, SubscriptionInfo>,
    },
    UnsubscribeNotifications {
        request_uuid: Uuid,
    },

    // GrowingObject
    DeleteParts {
        uri: String,
        uids: BTreeMap<String, String>,
    },
    DeletePartsByRange {
        uri: String,
        delete_interval: IndexInterval,
        include_overlapping_intervals: bool,
    },
    GetParts {
        uri: String,
        uids: BTreeMap<String, String>,
        format: String,
    },
    GetPartsByRange {
        uri: String,
        index_interval: IndexInterval,
        include_overlapping_intervals: bool,
        format: String,
    },
    PutParts {
        uri: String,
        parts: BTreeMap<String, ObjectPart>,
        format: String,
    },

    // GrowingObjectQuery
    FindParts {
        uri: String,
        format: String,
    },

    // ChannelSubscribe
    GetChannelMetadata {
        uris: BTreeMap<String, String>,
    },
    SubscribeChannels {
        channels: BTreeMap<String, ChannelSubscribeInfo>,
    },
    UnsubscribeChannels {
        channel_ids: BTreeMap<String, i64>,
    },
    GetRanges {
        request_uuid: Uuid,
        channel_ranges: Vec<ChannelRangeInfo>,
    },

    // ChannelDataLoad
    OpenChannelsResponse {
        channels: Vec<OpenChannelInfo>,
    },
}

impl Message {
    /// Protocol the message belongs to.
    #[must_use]
    pub const fn protocol(&self) -> Etp12Protocol {
        match self {
            Self::CloseSession { .. } => Etp12Protocol::Core,
            Self::GetResources { .. } => Etp12Protocol::Discovery,
            Self::FindResources { .. } => Etp12Protocol::DiscoveryQuery,
            Self::FindDataObjects { .. } => Etp12Protocol::StoreQuery,
            Self::GetDataObjects { .. }
            | Self::PutDataObjects { .. }
            | Self::DeleteDataObjects { .. } => Etp12Protocol::Store,
            Self::SubscribeNotifications { .. } | Self::UnsubscribeNotifications { .. } => {
                Etp12Protocol::StoreNotification
            }
            Self::DeleteParts { .. }
            | Self::DeletePartsByRange { .. }
            | Self::GetParts { .. }
            | Self::GetPartsByRange { .. }
            | Self::PutParts { .. } => Etp12Protocol::GrowingObject,
            Self::FindParts { .. } => Etp12Protocol::GrowingObjectQuery,
            Self::GetChannelMetadata { .. }
            | Self::SubscribeChannels { .. }
            | Self::UnsubscribeChannels { .. }
            | Self::GetRanges { .. } => Etp12Protocol::ChannelSubscribe,
            Self::OpenChannelsResponse { .. } => Etp12Protocol::ChannelDataLoad,
        }
    }

    /// Message type number within the protocol.
    #[must_use]
    pub const fn message_type(&self) -> i32 {
        match self {
            Self::CloseSession { .. } => 5,
            Self::GetResources { .. } => 1,
            Self::FindResources { .. } => 1,
            Self::FindDataObjects { .. } => 1,
            Self::GetDataObjects { .. } => 1,
            Self::PutDataObjects { .. } => 2,
            Self::DeleteDataObjects { .. } => 3,
            Self::SubscribeNotifications { .. } => 6,
            Self::UnsubscribeNotifications { .. } => 4,
            Self::DeleteParts { .. } => 1,
            Self::DeletePartsByRange { .. } => 2,
            Self::GetParts { .. } => 3,
            Self::GetPartsByRange { .. } => 4,
            Self::PutParts { .. } => 5,
            Self::FindParts { .. } => 1,
            Self::GetChannelMetadata { .. } => 1,
            Self::SubscribeChannels { .. } => 3,
            Self::UnsubscribeChannels { .. } => 7,
            Self::GetRanges { .. } => 9,
            Self::OpenChannelsResponse { .. } => 2,
        }
    }

    /// Message name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CloseSession { .. } => "CloseSession",
            Self::GetResources { .. } => "GetResources",
            Self::FindResources { .. } => "FindResources",
            Self::FindDataObjects { .. } => "FindDataObjects",
            Self::GetDataObjects { .. } => "GetDataObjects",
            Self::PutDataObjects { .. } => "PutDataObjects",
            Self::DeleteDataObjects { .. } => "DeleteDataObjects",
            Self::SubscribeNotifications { .. } => "SubscribeNotifications",
            Self::UnsubscribeNotifications { .. } => "UnsubscribeNotifications",
            Self::DeleteParts { .. } => "DeleteParts",
            Self::DeletePartsByRange { .. } => "DeletePartsByRange",
            Self::GetParts { .. } => "GetParts",
            Self::GetPartsByRange { .. } => "GetPartsByRange",
            Self::PutParts { .. } => "PutParts",
            Self::FindParts { .. } => "FindParts",
            Self::GetChannelMetadata { .. } => "GetChannelMetadata",
            Self::SubscribeChannels { .. } => "SubscribeChannels",
            Self::UnsubscribeChannels { .. } => "UnsubscribeChannels",
            Self::GetRanges { .. } => "GetRanges",
            Self::OpenChannelsResponse { .. } => "OpenChannelsResponse",
        }
    }
}

/// Wrap a single value in the single-entry map ETP 1.2 batch requests use.
pub fn single<V>(value: V) -> BTreeMap<String, V> {
    BTreeMap::from([("0".to_string(), value)])
}
