//! Response collection on top of the correlation contract.
//!
//! [`ResponseCollector`] groups inbound items by correlation id and hands a
//! group to its waiter once the group is complete (see
//! [`MessageHeader::completes_group`]). Unsolicited messages are ignored.
//!
//! The collector must be armed with [`begin`](ResponseCollector::begin) before
//! the request is sent: on a fast transport the whole response can arrive on
//! the delivery thread before the sender learns its message id. Completed
//! groups are held until claimed with [`wait`](ResponseCollector::wait) or
//! dropped by [`finish`](ResponseCollector::finish).
//!
//! # Examples
//!
//! ```rust
//! use etp_extender::ResponseCollector;
//! use etp_protocol::{MessageFlags, MessageHeader};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let collector = ResponseCollector::<&str>::new();
//! collector.begin();
//!
//! let multi = MessageFlags::MULTI_PART;
//! collector.accept(&MessageHeader::response(3, 2, 9, multi), Some("a"));
//! collector.accept(&MessageHeader::response(3, 2, 9, multi.with_final_part()), Some("b"));
//!
//! let group = collector.wait(9).await.unwrap();
//! assert_eq!(group.items, vec!["a", "b"]);
//! collector.finish();
//! # }
//! ```

use std::collections::HashMap;

use etp_protocol::MessageHeader;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::trace;

/// Peer-reported failure that closed a response group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// ETP error code
    pub code: i32,
    /// Error text
    pub message: String,
}

/// A completed response group.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseGroup<T> {
    /// Request the group answers
    pub correlation_id: i64,
    /// Items in arrival order
    pub items: Vec<T>,
    /// Set when the group was closed by a protocol exception
    pub error: Option<RemoteError>,
}

#[derive(Debug)]
struct Pending<T> {
    items: Vec<T>,
    done: Option<Option<RemoteError>>,
    waiter: Option<oneshot::Sender<ResponseGroup<T>>>,
}

impl<T> Default for Pending<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            done: None,
            waiter: None,
        }
    }
}

#[derive(Debug)]
struct State<T> {
    accepting: bool,
    groups: HashMap<i64, Pending<T>>,
}

/// Correlation-keyed accumulator with one-shot completion waiters.
#[derive(Debug)]
pub struct ResponseCollector<T> {
    state: Mutex<State<T>>,
}

impl<T> Default for ResponseCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResponseCollector<T> {
    /// Create an idle collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                accepting: false,
                groups: HashMap::new(),
            }),
        }
    }

    /// Start accepting messages.
    pub fn begin(&self) {
        self.state.lock().accepting = true;
    }

    /// Stop accepting messages and drop every unclaimed group.
    ///
    /// Outstanding waiters observe a closed channel.
    pub fn finish(&self) {
        let mut state = self.state.lock();
        state.accepting = false;
        state.groups.clear();
    }

    /// Whether the collector is between `begin` and `finish`.
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        self.state.lock().accepting
    }

    /// Add one message's items to its group.
    ///
    /// Returns `false` if the message was ignored (collector idle or message
    /// unsolicited).
    pub fn accept_many(&self, header: &MessageHeader, items: impl IntoIterator<Item = T>) -> bool {
        self.record(header, items, None)
    }

    /// Add at most one item to its group. `None` still counts toward completion.
    pub fn accept(&self, header: &MessageHeader, item: Option<T>) -> bool {
        self.record(header, item, None)
    }

    /// Close a group with a peer-reported failure.
    pub fn fail(&self, header: &MessageHeader, code: i32, message: impl Into<String>) -> bool {
        let error = RemoteError {
            code,
            message: message.into(),
        };
        self.record(header, std::iter::empty(), Some(error))
    }

    fn record(
        &self,
        header: &MessageHeader,
        items: impl IntoIterator<Item = T>,
        error: Option<RemoteError>,
    ) -> bool {
        let Some(correlation_id) = header.correlation() else {
            return false;
        };
        let mut state = self.state.lock();
        if !state.accepting {
            trace!(correlation_id, "Collector idle, message ignored");
            return false;
        }

        let group = state.groups.entry(correlation_id).or_default();
        if group.done.is_some() {
            trace!(correlation_id, "Group already complete, message ignored");
            return false;
        }
        group.items.extend(items);

        let completes = error.is_some() || header.completes_group();
        if !completes {
            return true;
        }

        trace!(correlation_id, items = group.items.len(), "Response group complete");
        match group.waiter.take() {
            Some(waiter) => {
                let items = std::mem::take(&mut group.items);
                state.groups.remove(&correlation_id);
                // Receiver may have been dropped by a timed-out waiter.
                let _ = waiter.send(ResponseGroup {
                    correlation_id,
                    items,
                    error,
                });
            }
            None => group.done = Some(error),
        }
        true
    }

    /// Wait for the group answering `correlation_id`.
    ///
    /// Resolves immediately if the group already completed. A second waiter
    /// for the same id replaces the first.
    pub fn wait(&self, correlation_id: i64) -> oneshot::Receiver<ResponseGroup<T>> {
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock();

        let completed = state
            .groups
            .get(&correlation_id)
            .is_some_and(|group| group.done.is_some());
        if completed {
            if let Some(group) = state.groups.remove(&correlation_id) {
                let _ = tx.send(ResponseGroup {
                    correlation_id,
                    items: group.items,
                    error: group.done.flatten(),
                });
            }
        } else {
            state.groups.entry(correlation_id).or_default().waiter = Some(tx);
        }
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etp_protocol::MessageFlags;
    use pretty_assertions::assert_eq;

    fn part(id: i64) -> MessageHeader {
        MessageHeader::response(3, 2, id, MessageFlags::MULTI_PART)
    }

    fn last(id: i64) -> MessageHeader {
        MessageHeader::response(3, 2, id, MessageFlags::MULTI_PART.with_final_part())
    }

    #[tokio::test]
    async fn test_interleaved_groups_complete_on_final_only() {
        let collector = ResponseCollector::new();
        collector.begin();
        let mut first = collector.wait(1);
        let mut second = collector.wait(2);

        collector.accept(&part(1), Some("1a"));
        collector.accept(&part(2), Some("2a"));
        collector.accept(&part(1), Some("1b"));
        assert!(first.try_recv().is_err());
        assert!(second.try_recv().is_err());

        collector.accept(&last(2), Some("2b"));
        assert!(first.try_recv().is_err());
        let group = second.await.unwrap();
        assert_eq!(group.items, vec!["2a", "2b"]);

        collector.accept(&last(1), None);
        assert_eq!(first.await.unwrap().items, vec!["1a", "1b"]);
    }

    #[tokio::test]
    async fn test_response_before_wait_is_kept() {
        let collector = ResponseCollector::new();
        collector.begin();
        let single = MessageHeader::response(3, 2, 5, MessageFlags::NONE);
        assert!(collector.accept(&single, Some(42)));
        let group = collector.wait(5).await.unwrap();
        assert_eq!(group.items, vec![42]);
        assert_eq!(group.error, None);
    }

    #[test]
    fn test_idle_and_unsolicited_are_ignored() {
        let collector = ResponseCollector::new();
        assert!(!collector.accept(&last(1), Some(1)));
        collector.begin();
        let push = MessageHeader::response(1, 3, 0, MessageFlags::NONE);
        assert!(!collector.accept(&push, Some(1)));
    }

    #[tokio::test]
    async fn test_exception_closes_group() {
        let collector = ResponseCollector::<i32>::new();
        collector.begin();
        let rx = collector.wait(8);
        collector.accept(&part(8), Some(1));
        collector.fail(&part(8), 11, "not found");
        let group = rx.await.unwrap();
        assert_eq!(group.items, vec![1]);
        assert_eq!(group.error.unwrap().code, 11);
    }

    #[tokio::test]
    async fn test_finish_drops_waiters() {
        let collector = ResponseCollector::<i32>::new();
        collector.begin();
        let rx = collector.wait(3);
        collector.finish();
        assert!(rx.await.is_err());
        assert!(!collector.is_accepting());
    }
}
