//! ETP 1.1 outbound messages.
//!
//! Only the messages the dispatch layer sends are modelled. Field names follow
//! the ETP 1.1 schema.

use serde::{Deserialize, Serialize};

use crate::protocol::Etp11Protocol;
use crate::types::DataObject;

/// ETP 1.1 stream start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamingStartIndex {
    /// Latest `n` values
    LatestValue(i32),
    /// Explicit index value
    IndexValue(i64),
    /// No start given; the producer streams from the beginning
    Null,
}

/// One channel of a `ChannelStreamingStart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStreamingInfo {
    /// Channel id
    pub channel_id: i64,
    /// Start position
    pub start_index: StreamingStartIndex,
    /// Whether status changes should be pushed
    pub receive_change_notification: bool,
}

/// One range of a `ChannelRangeRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRangeInfo {
    /// Channel ids
    pub channel_id: Vec<i64>,
    /// Range start
    pub start_index: i64,
    /// Range end
    pub end_index: i64,
}

/// Body of a `NotificationRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequestRecord {
    /// Subscribed URI
    pub uri: String,
    /// Subscription uuid
    pub uuid: String,
    /// Start time in microseconds since the epoch
    pub start_time: i64,
    /// Whether notifications carry object data
    pub include_object_data: bool,
    /// Object types of interest
    pub object_types: Vec<String>,
}

/// ETP 1.1 message sent by the dispatch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message", rename_all = "PascalCase")]
#[allow(missing_docs)]
pub enum Message {
    // Core
    CloseSession {
        reason: String,
    },

    // ChannelStreaming
    ChannelDescribe {
        uris: Vec<String>,
    },
    ChannelStreamingStart {
        channels: Vec<ChannelStreamingInfo>,
    },
    ChannelStreamingStop {
        channels: Vec<i64>,
    },
    ChannelRangeRequest {
        channel_ranges: Vec<ChannelRangeInfo>,
    },

    // Discovery
    GetResources {
        uri: String,
    },

    // Store
    GetObject {
        uri: String,
    },
    PutObject {
        data_object: DataObject,
    },
    DeleteObject {
        uri: String,
    },

    // StoreNotification
    NotificationRequest {
        request: NotificationRequestRecord,
    },
    CancelNotification {
        request_uuid: String,
    },

    // GrowingObject
    GrowingObjectDelete {
        uri: String,
        uid: String,
    },
    GrowingObjectDeleteRange {
        uri: String,
        start_index: Option<f64>,
        end_index: Option<f64>,
        uom: String,
        depth_datum: String,
    },
    GrowingObjectGet {
        uri: String,
        uid: String,
    },
    GrowingObjectGetRange {
        uri: String,
        start_index: Option<f64>,
        end_index: Option<f64>,
        uom: String,
        depth_datum: String,
    },
    GrowingObjectPut {
        uri: String,
        content_type: String,
        content_encoding: String,
        data: Vec<u8>,
    },
}

impl Message {
    /// Protocol the message belongs to.
    #[must_use]
    pub const fn protocol(&self) -> Etp11Protocol {
        match self {
            Self::CloseSession { .. } => Etp11Protocol::Core,
            Self::ChannelDescribe { .. }
            | Self::ChannelStreamingStart { .. }
            | Self::ChannelStreamingStop { .. }
            | Self::ChannelRangeRequest { .. } => Etp11Protocol::ChannelStreaming,
            Self::GetResources { .. } => Etp11Protocol::Discovery,
            Self::GetObject { .. } | Self::PutObject { .. } | Self::DeleteObject { .. } => {
                Etp11Protocol::Store
            }
            Self::NotificationRequest { .. } | Self::CancelNotification { .. } => {
                Etp11Protocol::StoreNotification
            }
            Self::GrowingObjectDelete { .. }
            | Self::GrowingObjectDeleteRange { .. }
            | Self::GrowingObjectGet { .. }
            | Self::GrowingObjectGetRange { .. }
            | Self::GrowingObjectPut { .. } => Etp11Protocol::GrowingObject,
        }
    }

    /// Message type number within the protocol.
    #[must_use]
    pub const fn message_type(&self) -> i32 {
        match self {
            Self::CloseSession { .. } => 5,
            Self::ChannelDescribe { .. } => 1,
            Self::ChannelStreamingStart { .. } => 4,
            Self::ChannelStreamingStop { .. } => 5,
            Self::ChannelRangeRequest { .. } => 9,
            Self::GetResources { .. } => 1,
            Self::GetObject { .. } => 1,
            Self::PutObject { .. } => 2,
            Self::DeleteObject { .. } => 3,
            Self::NotificationRequest { .. } => 1,
            Self::CancelNotification { .. } => 4,
            Self::GrowingObjectDelete { .. } => 1,
            Self::GrowingObjectDeleteRange { .. } => 2,
            Self::GrowingObjectGet { .. } => 3,
            Self::GrowingObjectGetRange { .. } => 4,
            Self::GrowingObjectPut { .. } => 5,
        }
    }

    /// Message name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CloseSession { .. } => "CloseSession",
            Self::ChannelDescribe { .. } => "ChannelDescribe",
            Self::ChannelStreamingStart { .. } => "ChannelStreamingStart",
            Self::ChannelStreamingStop { .. } => "ChannelStreamingStop",
            Self::ChannelRangeRequest { .. } => "ChannelRangeRequest",
            Self::GetResources { .. } => "GetResources",
            Self::GetObject { .. } => "GetObject",
            Self::PutObject { .. } => "PutObject",
            Self::DeleteObject { .. } => "DeleteObject",
            Self::NotificationRequest { .. } => "NotificationRequest",
            Self::CancelNotification { .. } => "CancelNotification",
            Self::GrowingObjectDelete { .. } => "GrowingObjectDelete",
            Self::GrowingObjectDeleteRange { .. } => "GrowingObjectDeleteRange",
            Self::GrowingObjectGet { .. } => "GrowingObjectGet",
            Self::GrowingObjectGetRange { .. } => "GrowingObjectGetRange",
            Self::GrowingObjectPut { .. } => "GrowingObjectPut",
        }
    }
}
