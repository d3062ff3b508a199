//! Synchronous Discovery Traversal.
//!
//! Walks a server's resource hierarchy one `GetResources` round trip at a time.
//! Each step arms a [`ResponseCollector`], sends the request, then waits for
//! the first of:
//!
//! - the response group for that request completing,
//! - the traversal's [`CancellationToken`] being cancelled,
//! - the configured response timeout elapsing.
//!
//! At most one request is outstanding at any time. A timeout or cancellation
//! aborts the run; nodes expanded so far are kept in the report.
//!
//! On construction the traversal attaches its response feed as an observer
//! ([`ProtocolExtender::observe`](crate::ProtocolExtender::observe)), so the
//! application's own callbacks, registered before or after, never displace it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use etp_extender::{CallbackTable, DiscoveryTraversal, ProtocolExtender, TraversalConfig};
//!
//! # async fn run(extender: Arc<dyn ProtocolExtender>) -> Result<(), etp_extender::SessionError> {
//! let traversal = DiscoveryTraversal::new(Arc::clone(&extender), TraversalConfig::default());
//! extender.register(CallbackTable::new().on_log(|_, message| eprintln!("{message:?}")))?;
//!
//! let report = traversal.expand_all("eml://").await?;
//! println!("{:?} after {} requests", report.state, report.requests);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use etp_protocol::{InboundMessage, MessageKind, Resource};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::callbacks::CallbackTable;
use crate::config::TraversalConfig;
use crate::correlation::ResponseCollector;
use crate::error::Result;
use crate::extender::ProtocolExtender;

/// Traversal state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalState {
    /// No run has started
    #[default]
    Idle,
    /// A run is in progress
    Running,
    /// The last run expanded every reachable node
    Completed,
    /// The last run was cancelled
    Cancelled,
    /// The last run stopped on a node that did not answer in time
    TimedOut,
}

/// Outcome of expanding one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion {
    /// The response arrived; these are the node's children
    Completed(Vec<Resource>),
    /// The cancellation token fired first
    Cancelled,
    /// The response timeout elapsed first
    TimedOut,
}

impl Expansion {
    fn state(&self) -> TraversalState {
        match self {
            Self::Completed(_) => TraversalState::Completed,
            Self::Cancelled => TraversalState::Cancelled,
            Self::TimedOut => TraversalState::TimedOut,
        }
    }
}

/// A resource and, once expanded, its children.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    /// The resource
    pub resource: Resource,
    /// Children, empty until expanded
    pub children: Vec<ResourceNode>,
    /// Whether the children were fetched
    pub expanded: bool,
}

impl ResourceNode {
    fn new(resource: Resource) -> Self {
        Self {
            resource,
            children: Vec::new(),
            expanded: false,
        }
    }

    /// Find a node by URI in this subtree.
    #[must_use]
    pub fn find(&self, uri: &str) -> Option<&ResourceNode> {
        if self.resource.uri == uri {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(uri))
    }

    /// Number of expanded nodes in this subtree.
    #[must_use]
    pub fn expanded_count(&self) -> usize {
        usize::from(self.expanded)
            + self
                .children
                .iter()
                .map(ResourceNode::expanded_count)
                .sum::<usize>()
    }
}

/// Result of an [`expand_all`](DiscoveryTraversal::expand_all) run.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalReport {
    /// Terminal state of the run
    pub state: TraversalState,
    /// Root of the (possibly partial) tree
    pub root: ResourceNode,
    /// Number of `GetResources` requests issued
    pub requests: usize,
}

/// Bounded, cancellable, strictly sequential resource hierarchy walk.
pub struct DiscoveryTraversal {
    extender: Arc<dyn ProtocolExtender>,
    config: TraversalConfig,
    collector: Arc<ResponseCollector<Resource>>,
    token: Mutex<CancellationToken>,
    state: Mutex<TraversalState>,
    step: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for DiscoveryTraversal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryTraversal")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish()
    }
}

type Step<'a> = Pin<Box<dyn Future<Output = Result<Option<TraversalState>>> + Send + 'a>>;

impl DiscoveryTraversal {
    /// Create a traversal over `extender`.
    ///
    /// Attaches the traversal's response feed to `extender` as an observer.
    pub fn new(extender: Arc<dyn ProtocolExtender>, config: TraversalConfig) -> Self {
        let collector = Arc::new(ResponseCollector::new());
        extender.observe(Self::feed(&collector));
        Self {
            extender,
            config,
            collector,
            token: Mutex::new(CancellationToken::new()),
            state: Mutex::new(TraversalState::Idle),
            step: tokio::sync::Mutex::new(()),
        }
    }

    /// Observer table routing discovery responses into `collector`.
    fn feed(collector: &Arc<ResponseCollector<Resource>>) -> CallbackTable {
        let resources = Arc::clone(collector);
        let exceptions = Arc::clone(collector);
        let acks = Arc::clone(collector);

        CallbackTable::new()
            .on(MessageKind::GetResourcesResponse, move |header, message| {
                if let InboundMessage::GetResourcesResponse { resources: items } = message {
                    resources.accept_many(header, items.iter().cloned());
                }
            })
            .on(MessageKind::ProtocolException, move |header, message| {
                if let InboundMessage::ProtocolException {
                    error_code,
                    message: text,
                } = message
                {
                    exceptions.fail(header, *error_code, text.clone());
                }
            })
            .on(MessageKind::Acknowledge, move |header, _| {
                // An empty result may be signalled by a bare acknowledge.
                if header.message_flags.is_no_data() {
                    acks.accept(header, None);
                }
            })
    }

    /// State of the current or last run.
    #[must_use]
    pub fn state(&self) -> TraversalState {
        *self.state.lock()
    }

    /// Cancel the running traversal. The blocked wait wakes immediately.
    ///
    /// Only the run in progress is cancelled. A run still queued behind it
    /// starts with a fresh token once it gets its turn.
    pub fn cancel_expand_all(&self) {
        info!("Cancelling discovery traversal");
        self.token.lock().cancel();
    }

    /// Expand `root_uri` and, depth first, every descendant with children.
    ///
    /// Runs are serialized. Each run takes a fresh cancellation token when it
    /// starts, so a cancel issued before then does not affect it.
    ///
    /// # Errors
    ///
    /// Returns the session's send error. Timeouts and cancellation are not
    /// errors; they are reported through [`TraversalReport::state`].
    pub async fn expand_all(&self, root_uri: &str) -> Result<TraversalReport> {
        let _step = self.step.lock().await;
        let token = self.fresh_token();
        *self.state.lock() = TraversalState::Running;
        info!(root = %root_uri, "Discovery traversal started");

        let mut root = ResourceNode::new(Resource::new(root_uri, root_uri).with_children(-1));
        let mut requests = 0;
        let outcome = self
            .expand_subtree(&mut root, 0, &token, &mut requests)
            .await;

        let state = match outcome {
            Ok(stopped) => stopped.unwrap_or(TraversalState::Completed),
            Err(err) => {
                *self.state.lock() = TraversalState::Idle;
                return Err(err);
            }
        };
        *self.state.lock() = state;

        match state {
            TraversalState::TimedOut => warn!(
                requests,
                expanded = root.expanded_count(),
                "Discovery traversal timed out"
            ),
            TraversalState::Cancelled => info!(
                requests,
                expanded = root.expanded_count(),
                "Discovery traversal cancelled"
            ),
            _ => info!(
                requests,
                expanded = root.expanded_count(),
                "Discovery traversal completed"
            ),
        }

        Ok(TraversalReport {
            state,
            root,
            requests,
        })
    }

    /// Expand a single node on demand.
    ///
    /// # Errors
    ///
    /// Returns the session's send error.
    pub async fn expand(&self, uri: &str) -> Result<Expansion> {
        let _step = self.step.lock().await;
        let token = {
            let mut current = self.token.lock();
            if current.is_cancelled() {
                *current = CancellationToken::new();
            }
            current.clone()
        };
        *self.state.lock() = TraversalState::Running;
        let expansion = self.expand_one(uri, &token).await;
        *self.state.lock() = match &expansion {
            Ok(expansion) => expansion.state(),
            Err(_) => TraversalState::Idle,
        };
        expansion
    }

    fn fresh_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.token.lock() = token.clone();
        token
    }

    /// Expand `node`, then recurse into its expandable children in order.
    ///
    /// Resolves to `Some(state)` when the walk must stop early.
    fn expand_subtree<'a>(
        &'a self,
        node: &'a mut ResourceNode,
        depth: usize,
        token: &'a CancellationToken,
        requests: &'a mut usize,
    ) -> Step<'a> {
        Box::pin(async move {
            *requests += 1;
            match self.expand_one(&node.resource.uri, token).await? {
                Expansion::Completed(children) => {
                    node.children = children.into_iter().map(ResourceNode::new).collect();
                    node.expanded = true;
                }
                stopped => return Ok(Some(stopped.state())),
            }

            if self.config.max_depth.is_some_and(|max| depth + 1 >= max) {
                return Ok(None);
            }

            for child in node.children.iter_mut() {
                if !child.resource.expandable() {
                    continue;
                }
                if let Some(stopped) = self
                    .expand_subtree(child, depth + 1, token, requests)
                    .await?
                {
                    return Ok(Some(stopped));
                }
            }
            Ok(None)
        })
    }

    /// One bounded `GetResources` round trip.
    async fn expand_one(&self, uri: &str, token: &CancellationToken) -> Result<Expansion> {
        if token.is_cancelled() {
            return Ok(Expansion::Cancelled);
        }

        self.collector.begin();
        let id = match self.extender.get_resources(uri) {
            Ok(id) => id,
            Err(err) => {
                self.collector.finish();
                return Err(err);
            }
        };
        if id == 0 {
            warn!(%uri, "Discovery not negotiated, node left empty");
            self.collector.finish();
            return Ok(Expansion::Completed(Vec::new()));
        }

        let response = self.collector.wait(id);
        let timeout = self.config.response_timeout();
        let expansion = tokio::select! {
            _ = token.cancelled() => Expansion::Cancelled,
            group = response => match group {
                Ok(group) => {
                    if let Some(error) = &group.error {
                        warn!(%uri, code = error.code, message = %error.message, "Discovery request failed");
                    }
                    debug!(%uri, children = group.items.len(), "Node expanded");
                    Expansion::Completed(group.items)
                }
                Err(_) => Expansion::Cancelled,
            },
            _ = tokio::time::sleep(timeout) => {
                warn!(%uri, correlation_id = id, timeout_ms = timeout.as_millis() as u64, "No response in time");
                Expansion::TimedOut
            },
        };
        self.collector.finish();
        Ok(expansion)
    }
}
