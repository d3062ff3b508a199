//! Version-neutral domain records.
//!
//! These are the shapes the dispatch layer hands to and receives from
//! application code. The per-version message families convert them into their
//! own wire shapes.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::protocol::ProtocolId;

// ============================================================================
// Discovery and Store
// ============================================================================

/// A node in a server's discoverable hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Resource URI
    pub uri: String,
    /// Display name
    pub name: String,
    /// Content type of the data object, empty for folders
    #[serde(default)]
    pub content_type: String,
    /// Resource kind (`"folder"`, `"dataObject"`, ...)
    #[serde(default)]
    pub resource_type: String,
    /// Child count; `-1` means unknown, `0` means leaf
    #[serde(default)]
    pub has_children: i32,
    /// Object uuid, when the resource is a data object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Last change time in microseconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<i64>,
}

impl Resource {
    /// Create a resource with no children.
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the child count.
    #[must_use]
    pub fn with_children(mut self, count: i32) -> Self {
        self.has_children = count;
        self
    }

    /// Whether a traversal should descend into this resource.
    #[must_use]
    pub const fn expandable(&self) -> bool {
        self.has_children > 0
    }
}

/// A data object with its serialized payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataObject {
    /// Descriptive resource
    pub resource: Resource,
    /// Payload encoding (empty or `"gzip"`)
    #[serde(default)]
    pub content_encoding: String,
    /// Serialized object
    #[serde(default)]
    pub data: Vec<u8>,
}

/// Kind of change reported by a store notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    /// Object was created or updated
    Upsert,
    /// Object was deleted
    Delete,
}

/// A store change notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    /// Change kind
    pub change_kind: ChangeKind,
    /// Change time in microseconds since the epoch
    pub change_time: i64,
    /// Changed object; payload may be empty when object data was not requested
    pub data_object: DataObject,
}

/// A notification subscription held by the subscription registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    /// Subscription id chosen by the requester
    pub request_id: Uuid,
    /// Subscribed URI
    pub uri: String,
    /// Only changes after this time are reported
    pub start_time: DateTime<Utc>,
    /// Whether notifications carry the object payload
    pub include_object_data: bool,
    /// Content types of interest, empty for all
    pub content_types: BTreeSet<String>,
}

// ============================================================================
// Channels
// ============================================================================

/// Kind of an index axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexKind {
    /// ETP 1.1 time index
    Time,
    /// ETP 1.1 depth index
    Depth,
    /// ETP 1.2 absolute time
    DateTime,
    /// ETP 1.2 elapsed time
    ElapsedTime,
    /// ETP 1.2 measured depth
    MeasuredDepth,
    /// ETP 1.2 true vertical depth
    TrueVerticalDepth,
    /// ETP 1.2 pass-indexed depth
    PassIndexedDepth,
    /// ETP 1.2 pressure
    Pressure,
    /// ETP 1.2 temperature
    Temperature,
    /// ETP 1.2 generic scalar
    Scalar,
}

/// Direction of an index axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexDirection {
    /// Values grow
    #[default]
    Increasing,
    /// Values shrink
    Decreasing,
    /// Unordered
    Unordered,
}

/// Description of one index axis of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMetadata {
    /// Axis kind
    pub kind: IndexKind,
    /// Axis direction
    #[serde(default)]
    pub direction: IndexDirection,
    /// Unit of measure
    #[serde(default)]
    pub uom: String,
    /// Axis mnemonic
    #[serde(default)]
    pub mnemonic: String,
    /// Depth datum, for depth axes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_datum: Option<String>,
}

impl IndexMetadata {
    /// Index of the given kind with default attributes.
    #[must_use]
    pub fn of_kind(kind: IndexKind) -> Self {
        Self {
            kind,
            direction: IndexDirection::Increasing,
            uom: String::new(),
            mnemonic: String::new(),
            depth_datum: None,
        }
    }
}

/// Metadata describing a streamable channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMetadataRecord {
    /// Channel URI
    pub channel_uri: String,
    /// Producer-assigned channel id
    pub channel_id: i64,
    /// Channel mnemonic
    pub channel_name: String,
    /// Value data type
    #[serde(default)]
    pub data_type: String,
    /// Unit of measure
    #[serde(default)]
    pub uom: String,
    /// Index axes
    #[serde(default)]
    pub indexes: Vec<IndexMetadata>,
    /// Channel status (`"active"`, `"inactive"`, `"closed"`)
    #[serde(default)]
    pub status: String,
}

/// A channel as presented to the user for selection.
///
/// A channel is *described* once its metadata has arrived from the producer;
/// only described channels can be streamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSelection {
    /// Channel URI
    pub uri: String,
    /// Metadata, once described
    pub metadata: Option<ChannelMetadataRecord>,
    /// Whether the user selected the channel
    pub selected: bool,
}

impl ChannelSelection {
    /// Whether the channel has been described.
    #[must_use]
    pub const fn is_described(&self) -> bool {
        self.metadata.is_some()
    }
}

/// Where a stream should start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StartIndex {
    /// The latest `n` values
    Latest(i32),
    /// From an explicit index value
    Index(i64),
    /// From the beginning of the channel
    Beginning,
}

impl Default for StartIndex {
    fn default() -> Self {
        Self::Latest(0)
    }
}

/// Per-channel streaming request, built transiently for one stream start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingChannelInfo {
    /// Channel id from the channel metadata
    pub channel_id: i64,
    /// Requested start
    pub start_index: StartIndex,
    /// Whether status changes should be pushed
    pub receive_change_notification: bool,
}

/// Index range for a channel range request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRange {
    /// Channels covered by the range
    pub channel_ids: Vec<i64>,
    /// Inclusive start index
    pub start_index: i64,
    /// Inclusive end index
    pub end_index: i64,
}

/// One streamed data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataItem {
    /// Channel id
    pub channel_id: i64,
    /// Index values, one per index axis
    pub indexes: Vec<i64>,
    /// Channel value
    pub value: Value,
}

// ============================================================================
// Growing objects
// ============================================================================

/// A part of a growing object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPart {
    /// Parent object URI
    pub uri: String,
    /// Part uid
    pub uid: String,
    /// Part content type
    #[serde(default)]
    pub content_type: String,
    /// Serialized part
    #[serde(default)]
    pub data: Vec<u8>,
}

/// Index interval addressing parts of a growing object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsRange {
    /// Interval start, `None` for open
    pub start: Option<f64>,
    /// Interval end, `None` for open
    pub end: Option<f64>,
    /// Unit of measure of the bounds
    #[serde(default)]
    pub uom: String,
    /// Depth datum of the bounds
    #[serde(default)]
    pub depth_datum: String,
}

// ============================================================================
// Core
// ============================================================================

/// Session parameters announced by the peer when a session opens.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionInfo {
    /// Server-assigned session id
    pub session_id: String,
    /// Peer application name
    pub application_name: String,
    /// Peer application version
    pub application_version: String,
    /// Protocols the peer agreed to
    #[serde(default)]
    pub supported_protocols: Vec<ProtocolId>,
}
