use etp_protocol::messages::v12::{
    self, ChannelRangeInfo, ChannelStartIndex, ChannelSubscribeInfo, ContextInfo,
    ContextScopeKind, IndexInterval, Message, OpenChannelInfo, SubscriptionInfo,
};
use etp_protocol::{
    Capability, Etp12Protocol, IndexKind, IndexMetadata, MessageBody, OutboundMessage, PartsRange,
    Role, StartIndex, WireVersion,
};
use uuid::Uuid;

use super::{Operation, Request, WireProfile};

const FORMAT: &str = "xml";

/// ETP 1.2 profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Etp12;

fn start_index(start: StartIndex) -> ChannelStartIndex {
    match start {
        StartIndex::Latest(count) => ChannelStartIndex::RequestLatestIndexCount(count),
        StartIndex::Index(value) => ChannelStartIndex::StartIndex(value),
        StartIndex::Beginning => ChannelStartIndex::Beginning,
    }
}

fn interval(range: PartsRange) -> IndexInterval {
    IndexInterval {
        start_index: range.start,
        end_index: range.end,
        uom: range.uom,
        depth_datum: range.depth_datum,
    }
}

// Batch maps keyed by position, as ETP 1.2 expects string keys.
fn keyed<V>(values: impl IntoIterator<Item = V>) -> std::collections::BTreeMap<String, V> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

impl WireProfile for Etp12 {
    const VERSION: WireVersion = WireVersion::V12;

    fn capability(operation: Operation) -> Option<Capability> {
        let (protocol, role) = match operation {
            Operation::GetResources => (Etp12Protocol::Discovery, Role::Customer),
            Operation::FindResources => (Etp12Protocol::DiscoveryQuery, Role::Customer),
            Operation::FindObjects => (Etp12Protocol::StoreQuery, Role::Customer),
            Operation::GetObject | Operation::PutObject | Operation::DeleteObject => {
                (Etp12Protocol::Store, Role::Customer)
            }
            Operation::NotificationRequest | Operation::CancelNotification => {
                (Etp12Protocol::StoreNotification, Role::Customer)
            }
            Operation::FindParts => (Etp12Protocol::GrowingObjectQuery, Role::Customer),
            Operation::GetPart
            | Operation::GetPartsByRange
            | Operation::PutPart
            | Operation::DeletePart
            | Operation::DeletePartsByRange => (Etp12Protocol::GrowingObject, Role::Customer),
            Operation::ChannelDescribe
            | Operation::ChannelStreamingStart
            | Operation::ChannelStreamingStop
            | Operation::ChannelRangeRequest => (Etp12Protocol::ChannelSubscribe, Role::Customer),
            Operation::OpenChannelResponse => (Etp12Protocol::ChannelDataLoad, Role::Store),
        };
        Some(Capability::new(protocol.id(), role))
    }

    fn is_time_index(index: &IndexMetadata) -> bool {
        matches!(index.kind, IndexKind::DateTime | IndexKind::ElapsedTime)
    }

    fn build(request: Request) -> Option<OutboundMessage> {
        let message = match request {
            Request::GetResources { uri } => Message::GetResources {
                context: ContextInfo::one_level(uri),
                scope: ContextScopeKind::Targets,
                count_objects: true,
            },
            Request::FindResources { uri } => Message::FindResources {
                context: ContextInfo::one_level(uri),
                scope: ContextScopeKind::Targets,
            },
            Request::FindObjects { uri } => Message::FindDataObjects {
                context: ContextInfo::one_level(uri),
                scope: ContextScopeKind::Targets,
                format: FORMAT.into(),
            },
            Request::GetObject { uri } => Message::GetDataObjects {
                uris: v12::single(uri),
                format: FORMAT.into(),
            },
            Request::PutObject { data_object } => Message::PutDataObjects {
                data_objects: v12::single(data_object),
            },
            Request::DeleteObject { uri } => Message::DeleteDataObjects {
                uris: v12::single(uri),
            },
            Request::NotificationRequest { record } => Message::SubscribeNotifications {
                request: v12::single(SubscriptionInfo {
                    context: ContextInfo {
                        data_object_types: record.content_types.into_iter().collect(),
                        ..ContextInfo::one_level(record.uri)
                    },
                    scope: ContextScopeKind::SelfOnly,
                    request_uuid: record.request_id,
                    include_object_data: record.include_object_data,
                    format: FORMAT.into(),
                }),
            },
            Request::CancelNotification { request_id } => Message::UnsubscribeNotifications {
                request_uuid: request_id,
            },
            Request::FindParts { uri } => Message::FindParts {
                uri,
                format: FORMAT.into(),
            },
            Request::GetPart { uri, uid } => Message::GetParts {
                uri,
                uids: v12::single(uid),
                format: FORMAT.into(),
            },
            Request::GetPartsByRange { uri, range } => Message::GetPartsByRange {
                uri,
                index_interval: interval(range),
                include_overlapping_intervals: true,
                format: FORMAT.into(),
            },
            Request::PutPart { part } => Message::PutParts {
                uri: part.uri.clone(),
                parts: v12::single(part),
                format: FORMAT.into(),
            },
            Request::DeletePart { uri, uid } => Message::DeleteParts {
                uri,
                uids: v12::single(uid),
            },
            Request::DeletePartsByRange { uri, range } => Message::DeletePartsByRange {
                uri,
                delete_interval: interval(range),
                include_overlapping_intervals: true,
            },
            Request::ChannelDescribe { uris } => Message::GetChannelMetadata { uris: keyed(uris) },
            Request::ChannelStreamingStart { channels } => Message::SubscribeChannels {
                channels: keyed(channels.into_iter().map(|c| ChannelSubscribeInfo {
                    channel_id: c.channel_id,
                    start_index: start_index(c.start_index),
                    data_changes: c.receive_change_notification,
                })),
            },
            Request::ChannelStreamingStop { channel_ids } => Message::UnsubscribeChannels {
                channel_ids: keyed(channel_ids),
            },
            Request::ChannelRangeRequest { range } => Message::GetRanges {
                request_uuid: Uuid::new_v4(),
                channel_ranges: vec![ChannelRangeInfo {
                    channel_ids: range.channel_ids,
                    interval: IndexInterval {
                        start_index: Some(range.start_index as f64),
                        end_index: Some(range.end_index as f64),
                        ..IndexInterval::default()
                    },
                }],
            },
            Request::OpenChannelResponse {
                correlation_id,
                channels,
            } => {
                let body = Message::OpenChannelsResponse {
                    channels: channels
                        .into_iter()
                        .map(|metadata| OpenChannelInfo {
                            metadata,
                            preexisting: false,
                        })
                        .collect(),
                };
                return Some(OutboundMessage::response(
                    MessageBody::V12(body),
                    correlation_id,
                ));
            }
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
    use etp_protocol::ChannelRange;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_time_index_kinds() {
        assert!(Etp12::is_time_index(&IndexMetadata::of_kind(IndexKind::DateTime)));
        assert!(Etp12::is_time_index(&IndexMetadata::of_kind(IndexKind::ElapsedTime)));
        assert!(!Etp12::is_time_index(&IndexMetadata::of_kind(IndexKind::Time)));
        assert!(!Etp12::is_time_index(&IndexMetadata::of_kind(
            IndexKind::MeasuredDepth
        )));
    }

    #[test]
    fn test_channel_describe_keys_by_position() {
        let msg = Etp12::build(Request::ChannelDescribe {
            uris: vec!["eml:///log(1)/a".into(), "eml:///log(1)/b".into()],
        })
        .unwrap();
        assert_eq!(msg.header.protocol, Etp12Protocol::ChannelSubscribe as i32);
        let MessageBody::V12(Message::GetChannelMetadata { uris }) = msg.body else {
            panic!("unexpected body");
        };
        assert_eq!(uris["1"], "eml:///log(1)/b");
    }

    #[test]
    fn test_open_channel_response_is_correlated() {
        let msg = Etp12::build(Request::OpenChannelResponse {
            correlation_id: 12,
            channels: Vec::new(),
        })
        .unwrap();
        assert_eq!(msg.header.correlation(), Some(12));
        assert!(msg.header.completes_group());
    }

    #[test]
    fn test_range_request_uses_interval() {
        let msg = Etp12::build(Request::ChannelRangeRequest {
            range: ChannelRange {
                channel_ids: vec![1, 2],
                start_index: 100,
                end_index: 200,
            },
        })
        .unwrap();
        let MessageBody::V12(Message::GetRanges { channel_ranges, .. }) = msg.body else {
            panic!("unexpected body");
        };
        assert_eq!(channel_ranges[0].interval.start_index, Some(100.0));
        assert_eq!(channel_ranges[0].channel_ids, vec![1, 2]);
    }
}
