//! Callback table: one application callback per inbound message kind.
//!
//! The table is an explicit dispatch map keyed by [`MessageKind`]. Registering
//! a callback for a kind replaces the previous one for that kind only, so
//! [`CallbackTable::merge`] gives the "omitted callbacks keep their previous
//! value" behaviour the extender's `register` needs.
//!
//! When two parties want to observe the same kind (for example the discovery
//! traversal and the application's own tree view), [`CallbackTable::chain`]
//! composes them instead of letting one replace the other.
//!
//! # Examples
//!
//! ```rust
//! use etp_extender::CallbackTable;
//! use etp_protocol::MessageKind;
//!
//! let table = CallbackTable::new()
//!     .on(MessageKind::GetResourcesResponse, |header, message| {
//!         println!("{} -> {:?}", header.correlation_id, message);
//!     })
//!     .on_log(|header, message| eprintln!("{header:?}: {message:?}"));
//!
//! assert!(table.has(MessageKind::GetResourcesResponse));
//! assert!(table.has(MessageKind::ProtocolException));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use etp_protocol::{InboundMessage, MessageHeader, MessageKind};
use tracing::debug;

/// Application callback for one message kind.
pub type Callback = Arc<dyn Fn(&MessageHeader, &InboundMessage) + Send + Sync>;

/// Map from message kind to callback.
#[derive(Clone, Default)]
pub struct CallbackTable {
    callbacks: HashMap<MessageKind, Callback>,
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.callbacks.keys().collect();
        kinds.sort();
        f.debug_struct("CallbackTable").field("kinds", &kinds).finish()
    }
}

impl CallbackTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback for `kind`.
    #[must_use]
    pub fn on<F>(mut self, kind: MessageKind, callback: F) -> Self
    where
        F: Fn(&MessageHeader, &InboundMessage) + Send + Sync + 'static,
    {
        self.set(kind, Arc::new(callback));
        self
    }

    /// Set the logging callback, which receives every `Acknowledge` and
    /// `ProtocolException` regardless of originating protocol.
    #[must_use]
    pub fn on_log<F>(mut self, callback: F) -> Self
    where
        F: Fn(&MessageHeader, &InboundMessage) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        self.set(MessageKind::Acknowledge, Arc::clone(&callback));
        self.set(MessageKind::ProtocolException, callback);
        self
    }

    /// Set the callback for `kind` in place.
    pub fn set(&mut self, kind: MessageKind, callback: Callback) {
        debug!(?kind, "Setting callback");
        self.callbacks.insert(kind, callback);
    }

    /// Whether a callback is set for `kind`.
    #[must_use]
    pub fn has(&self, kind: MessageKind) -> bool {
        self.callbacks.contains_key(&kind)
    }

    /// Callback for `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: MessageKind) -> Option<Callback> {
        self.callbacks.get(&kind).cloned()
    }

    /// Number of kinds with a callback.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no callback is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Overwrite entries present in `other`; entries absent from `other` are
    /// left untouched.
    pub fn merge(&mut self, other: CallbackTable) {
        self.callbacks.extend(other.callbacks);
    }

    /// Compose with `other`: for kinds set in both tables, `self`'s callback
    /// runs first, then `other`'s.
    #[must_use]
    pub fn chain(mut self, other: CallbackTable) -> Self {
        for (kind, second) in other.callbacks {
            let composed: Callback = match self.callbacks.remove(&kind) {
                Some(first) => Arc::new(move |header: &MessageHeader, message: &InboundMessage| {
                    first(header, message);
                    second(header, message);
                }),
                None => second,
            };
            self.callbacks.insert(kind, composed);
        }
        self
    }

    /// Invoke the callback for the message's kind. Returns whether one ran.
    pub fn dispatch(&self, header: &MessageHeader, message: &InboundMessage) -> bool {
        match self.get(message.kind()) {
            Some(callback) => {
                callback(header, message);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etp_protocol::MessageFlags;
    use parking_lot::Mutex;

    fn header() -> MessageHeader {
        MessageHeader::response(3, 2, 7, MessageFlags::FINAL_PART)
    }

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Callback {
        let log = Arc::clone(log);
        Arc::new(move |_: &MessageHeader, _: &InboundMessage| log.lock().push(tag))
    }

    #[test]
    fn test_merge_keeps_omitted_entries() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut table = CallbackTable::new();
        table.set(MessageKind::Acknowledge, recorder(&log, "ack-1"));
        table.set(MessageKind::OpenSession, recorder(&log, "open-1"));

        let mut update = CallbackTable::new();
        update.set(MessageKind::Acknowledge, recorder(&log, "ack-2"));
        table.merge(update);

        table.dispatch(&header(), &InboundMessage::Acknowledge);
        table.dispatch(
            &header(),
            &InboundMessage::OpenSession(Default::default()),
        );
        assert_eq!(*log.lock(), vec!["ack-2", "open-1"]);
    }

    #[test]
    fn test_chain_runs_both_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut first = CallbackTable::new();
        first.set(MessageKind::Acknowledge, recorder(&log, "first"));
        let mut second = CallbackTable::new();
        second.set(MessageKind::Acknowledge, recorder(&log, "second"));
        second.set(MessageKind::CloseSession, recorder(&log, "close"));

        let table = first.chain(second);
        assert!(table.dispatch(&header(), &InboundMessage::Acknowledge));
        assert!(!table.dispatch(
            &header(),
            &InboundMessage::ChannelData { data: Vec::new() }
        ));
        assert_eq!(*log.lock(), vec!["first", "second"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_on_log_covers_ack_and_exception() {
        let table = CallbackTable::new().on_log(|_, _| {});
        assert!(table.has(MessageKind::Acknowledge));
        assert!(table.has(MessageKind::ProtocolException));
        assert!(!table.has(MessageKind::OpenSession));
    }
}
