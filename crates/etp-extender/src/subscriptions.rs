//! Subscription Registry.
//!
//! Per-session bookkeeping of outstanding notification subscriptions and the
//! channels currently being streamed. Request ids from a previous connection
//! mean nothing after a reconnect, so the extender clears the whole registry
//! whenever a session (re)opens.

use etp_protocol::{StreamingChannelInfo, SubscriptionRecord};
use tracing::debug;
use uuid::Uuid;

/// Notification subscriptions and streaming channel descriptors of one session.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionRegistry {
    notifications: Vec<SubscriptionRecord>,
    channels: Vec<StreamingChannelInfo>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a subscription.
    pub fn add_subscription(&mut self, record: SubscriptionRecord) {
        debug!(request_id = %record.request_id, uri = %record.uri, "Subscription added");
        self.notifications.push(record);
    }

    /// Look up a subscription by request id.
    #[must_use]
    pub fn subscription(&self, request_id: Uuid) -> Option<&SubscriptionRecord> {
        self.notifications.iter().find(|r| r.request_id == request_id)
    }

    /// Remove the subscription with `request_id`, if present.
    pub fn remove_subscription(&mut self, request_id: Uuid) -> Option<SubscriptionRecord> {
        let index = self
            .notifications
            .iter()
            .position(|r| r.request_id == request_id)?;
        debug!(%request_id, "Subscription removed");
        Some(self.notifications.remove(index))
    }

    /// Outstanding subscriptions, oldest first.
    #[must_use]
    pub fn subscriptions(&self) -> &[SubscriptionRecord] {
        &self.notifications
    }

    /// Replace the streaming channel list wholesale.
    pub fn replace_channels(&mut self, channels: Vec<StreamingChannelInfo>) {
        debug!(count = channels.len(), "Streaming channels replaced");
        self.channels = channels;
    }

    /// Channels of the last stream start.
    #[must_use]
    pub fn channels(&self) -> &[StreamingChannelInfo] {
        &self.channels
    }

    /// Whether both lists are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty() && self.channels.is_empty()
    }

    /// Drop every subscription and channel.
    pub fn clear(&mut self) {
        self.notifications.clear();
        self.channels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use etp_protocol::StartIndex;

    fn record(uri: &str) -> SubscriptionRecord {
        SubscriptionRecord {
            request_id: Uuid::new_v4(),
            uri: uri.into(),
            start_time: Utc::now(),
            include_object_data: false,
            content_types: Default::default(),
        }
    }

    #[test]
    fn test_remove_only_matching_record() {
        let mut registry = SubscriptionRegistry::new();
        let a = record("eml://a");
        let b = record("eml://b");
        registry.add_subscription(a.clone());
        registry.add_subscription(b.clone());

        assert_eq!(registry.remove_subscription(Uuid::new_v4()), None);
        assert_eq!(registry.subscriptions().len(), 2);

        assert_eq!(registry.remove_subscription(a.request_id), Some(a));
        assert_eq!(registry.subscriptions(), &[b]);
    }

    #[test]
    fn test_clear_empties_both_lists() {
        let mut registry = SubscriptionRegistry::new();
        registry.add_subscription(record("eml://a"));
        registry.replace_channels(vec![StreamingChannelInfo {
            channel_id: 1,
            start_index: StartIndex::Beginning,
            receive_change_notification: true,
        }]);
        assert!(!registry.is_empty());
        registry.clear();
        assert!(registry.is_empty());
    }
}
