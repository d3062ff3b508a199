use etp_protocol::messages::v11::{
    ChannelRangeInfo, ChannelStreamingInfo, Message, NotificationRequestRecord,
    StreamingStartIndex,
};
use etp_protocol::{
    Capability, Etp11Protocol, IndexKind, IndexMetadata, OutboundMessage, Role, StartIndex,
    WireVersion,
};

use super::{Operation, Request, WireProfile};

/// ETP 1.1 profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Etp11;

fn start_index(start: StartIndex) -> StreamingStartIndex {
    match start {
        StartIndex::Latest(count) => StreamingStartIndex::LatestValue(count),
        StartIndex::Index(value) => StreamingStartIndex::IndexValue(value),
        StartIndex::Beginning => StreamingStartIndex::Null,
    }
}

impl WireProfile for Etp11 {
    const VERSION: WireVersion = WireVersion::V11;

    fn capability(operation: Operation) -> Option<Capability> {
        let (protocol, role) = match operation {
            Operation::GetResources => (Etp11Protocol::Discovery, Role::Customer),
            Operation::GetObject | Operation::PutObject | Operation::DeleteObject => {
                (Etp11Protocol::Store, Role::Customer)
            }
            Operation::NotificationRequest | Operation::CancelNotification => {
                (Etp11Protocol::StoreNotification, Role::Customer)
            }
            Operation::GetPart
            | Operation::GetPartsByRange
            | Operation::PutPart
            | Operation::DeletePart
            | Operation::DeletePartsByRange => (Etp11Protocol::GrowingObject, Role::Customer),
            Operation::ChannelDescribe
            | Operation::ChannelStreamingStart
            | Operation::ChannelStreamingStop
            | Operation::ChannelRangeRequest => (Etp11Protocol::ChannelStreaming, Role::Consumer),
            Operation::FindResources
            | Operation::FindObjects
            | Operation::FindParts
            | Operation::OpenChannelResponse => return None,
        };
        Some(Capability::new(protocol.id(), role))
    }

    fn is_time_index(index: &IndexMetadata) -> bool {
        index.kind == IndexKind::Time
    }

    fn build(request: Request) -> Option<OutboundMessage> {
        let message = match request {
            Request::GetResources { uri } => Message::GetResources { uri },
            Request::GetObject { uri } => Message::GetObject { uri },
            Request::PutObject { data_object } => Message::PutObject { data_object },
            Request::DeleteObject { uri } => Message::DeleteObject { uri },
            Request::NotificationRequest { record } => Message::NotificationRequest {
                request: NotificationRequestRecord {
                    uri: record.uri,
                    uuid: record.request_id.to_string(),
                    start_time: record.start_time.timestamp_micros(),
                    include_object_data: record.include_object_data,
                    object_types: record.content_types.into_iter().collect(),
                },
            },
            Request::CancelNotification { request_id } => Message::CancelNotification {
                request_uuid: request_id.to_string(),
            },
            Request::GetPart { uri, uid } => Message::GrowingObjectGet { uri, uid },
            Request::GetPartsByRange { uri, range } => Message::GrowingObjectGetRange {
                uri,
                start_index: range.start,
                end_index: range.end,
                uom: range.uom,
                depth_datum: range.depth_datum,
            },
            Request::PutPart { part } => Message::GrowingObjectPut {
                uri: part.uri,
                content_type: part.content_type,
                content_encoding: String::new(),
                data: part.data,
            },
            Request::DeletePart { uri, uid } => Message::GrowingObjectDelete { uri, uid },
            Request::DeletePartsByRange { uri, range } => Message::GrowingObjectDeleteRange {
                uri,
                start_index: range.start,
                end_index: range.end,
                uom: range.uom,
                depth_datum: range.depth_datum,
            },
            Request::ChannelDescribe { uris } => Message::ChannelDescribe { uris },
            Request::ChannelStreamingStart { channels } => Message::ChannelStreamingStart {
                channels: channels
                    .into_iter()
                    .map(|c| ChannelStreamingInfo {
                        channel_id: c.channel_id,
                        start_index: start_index(c.start_index),
                        receive_change_notification: c.receive_change_notification,
                    })
                    .collect(),
            },
            Request::ChannelStreamingStop { channel_ids } => Message::ChannelStreamingStop {
                channels: channel_ids,
            },
            Request::ChannelRangeRequest { range } => Message::ChannelRangeRequest {
                channel_ranges: vec![ChannelRangeInfo {
                    channel_id: range.channel_ids,
                    start_index: range.start_index,
                    end_index: range.end_index,
                }],
            },
            Request::FindResources { .. }
            | Request::FindObjects { .. }
            | Request::FindParts { .. }
            | Request::OpenChannelResponse { .. } => return None,
        };
        Some(message.into())
    }

    fn close_session(reason: String) -> OutboundMessage {
        Message::CloseSession { reason }.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use etp_protocol::{MessageBody, SubscriptionRecord};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    #[test]
    fn test_time_index_is_time_kind_only() {
        assert!(Etp11::is_time_index(&IndexMetadata::of_kind(IndexKind::Time)));
        assert!(!Etp11::is_time_index(&IndexMetadata::of_kind(IndexKind::Depth)));
        assert!(!Etp11::is_time_index(&IndexMetadata::of_kind(IndexKind::DateTime)));
    }

    #[test]
    fn test_notification_request_uses_microseconds() {
        let id = Uuid::new_v4();
        let record = SubscriptionRecord {
            request_id: id,
            uri: "eml://witsml14/well".into(),
            start_time: Utc.timestamp_opt(10, 0).unwrap(),
            include_object_data: true,
            content_types: ["application/x-witsml+xml;version=1.4.1.1;type=well".to_string()]
                .into_iter()
                .collect(),
        };
        let msg = Etp11::build(Request::NotificationRequest { record }).unwrap();
        let MessageBody::V11(Message::NotificationRequest { request }) = msg.body else {
            panic!("unexpected body");
        };
        assert_eq!(request.start_time, 10_000_000);
        assert_eq!(request.uuid, id.to_string());
        assert_eq!(msg.header.protocol, Etp11Protocol::StoreNotification as i32);
    }

    #[test]
    fn test_start_index_mapping() {
        let msg = Etp11::build(Request::ChannelStreamingStart {
            channels: vec![etp_protocol::StreamingChannelInfo {
                channel_id: 4,
                start_index: StartIndex::Latest(10),
                receive_change_notification: true,
            }],
        })
        .unwrap();
        let MessageBody::V11(Message::ChannelStreamingStart { channels }) = msg.body else {
            panic!("unexpected body");
        };
        assert_eq!(channels[0].start_index, StreamingStartIndex::LatestValue(10));
        assert_eq!(msg.header.message_type, 4);
    }
}
