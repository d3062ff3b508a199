//! Integration tests for the discovery traversal and response correlation
//!
//! The recording session answers `GetResources` synchronously from a scripted
//! resource tree. Nodes listed as silent never get an answer, which drives the
//! timeout and cancellation paths. Time is paused so bounded waits resolve
//! instantly and deterministically.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use etp_extender::test_helpers::{RecordingSession, final_response, requested_uri, resources_response};
use etp_extender::{
    CallbackTable, DiscoveryTraversal, Etp11Extender, Etp12Extender, Expansion, ProtocolExtender,
    ResponseCollector, TraversalConfig, TraversalState,
};
use etp_protocol::{
    Capability, Etp11Protocol, InboundMessage, MessageFlags, MessageHeader, ProtocolCatalog,
    Resource, Role, WireVersion,
};
use pretty_assertions::assert_eq;
use tokio::time::Instant;

// ============================================================================
// FIXTURES
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// eml://
/// ├── well(1)           2 children
/// │   ├── wellbore(11)  1 child
/// │   │   └── log(111)
/// │   └── wellbore(12)
/// ├── well(2)           1 child
/// │   └── wellbore(21)
/// └── well(3)
fn well_tree() -> HashMap<String, Vec<Resource>> {
    let node = |uri: &str, children: i32| Resource::new(uri, uri).with_children(children);
    HashMap::from([
        (
            "eml://".to_string(),
            vec![
                node("eml://well(1)", 2),
                node("eml://well(2)", 1),
                node("eml://well(3)", 0),
            ],
        ),
        (
            "eml://well(1)".to_string(),
            vec![
                node("eml://well(1)/wellbore(11)", 1),
                node("eml://well(1)/wellbore(12)", 0),
            ],
        ),
        (
            "eml://well(1)/wellbore(11)".to_string(),
            vec![node("eml://well(1)/wellbore(11)/log(111)", 0)],
        ),
        (
            "eml://well(2)".to_string(),
            vec![node("eml://well(2)/wellbore(21)", 0)],
        ),
    ])
}

struct Harness {
    session: Arc<RecordingSession>,
    extender: Arc<dyn ProtocolExtender>,
    traversal: Arc<DiscoveryTraversal>,
}

fn harness(version: WireVersion, config: TraversalConfig, silent: &[&str]) -> Harness {
    init_tracing();
    let session = Arc::new(RecordingSession::client(version));
    let requests = ProtocolCatalog::for_version(version).default_role_requests();
    let extender: Arc<dyn ProtocolExtender> = match version {
        WireVersion::V11 => Arc::new(Etp11Extender::new(&session, requests)),
        WireVersion::V12 => Arc::new(Etp12Extender::new(&session, requests)),
    };
    let traversal = Arc::new(DiscoveryTraversal::new(Arc::clone(&extender), config));
    extender
        .register(CallbackTable::new())
        .unwrap();

    let tree = well_tree();
    let silent: HashSet<String> = silent.iter().map(|s| (*s).to_string()).collect();
    session.set_responder(move |request| {
        let Some(uri) = requested_uri(request) else {
            return Vec::new();
        };
        if silent.contains(uri) {
            return Vec::new();
        }
        resources_response(request, tree.get(uri).cloned().unwrap_or_default())
    });

    Harness {
        session,
        extender,
        traversal,
    }
}

fn fast() -> TraversalConfig {
    TraversalConfig::default().with_response_timeout(Duration::from_millis(50))
}

// ============================================================================
// EXPAND ALL
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_expand_all_walks_whole_tree() {
    for version in [WireVersion::V11, WireVersion::V12] {
        let h = harness(version, fast(), &[]);
        let report = h.traversal.expand_all("eml://").await.unwrap();

        assert_eq!(report.state, TraversalState::Completed);
        assert_eq!(h.traversal.state(), TraversalState::Completed);
        // Root plus every node with children.
        assert_eq!(report.requests, 4);
        assert_eq!(report.root.expanded_count(), 4);
        assert_eq!(report.root.children.len(), 3);

        let log = report
            .root
            .find("eml://well(1)/wellbore(11)/log(111)")
            .unwrap();
        assert!(!log.expanded);
        assert_eq!(h.session.sent_count(), 4);
    }
}

#[tokio::test(start_paused = true)]
async fn test_requests_are_strictly_depth_first() {
    let h = harness(WireVersion::V11, fast(), &[]);
    h.traversal.expand_all("eml://").await.unwrap();

    let order: Vec<String> = h
        .session
        .sent()
        .iter()
        .filter_map(|m| requested_uri(m).map(str::to_string))
        .collect();
    assert_eq!(
        order,
        [
            "eml://",
            "eml://well(1)",
            "eml://well(1)/wellbore(11)",
            "eml://well(2)",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_silent_node_times_out_and_keeps_expanded_siblings() {
    let h = harness(WireVersion::V11, fast(), &["eml://well(2)"]);
    let started = Instant::now();
    let report = h.traversal.expand_all("eml://").await.unwrap();

    assert_eq!(report.state, TraversalState::TimedOut);
    assert!(started.elapsed() >= Duration::from_millis(50));

    // well(1) and its subtree were expanded before well(2) stalled.
    let well1 = report.root.find("eml://well(1)").unwrap();
    assert!(well1.expanded);
    assert_eq!(well1.children.len(), 2);
    assert!(
        report
            .root
            .find("eml://well(1)/wellbore(11)")
            .unwrap()
            .expanded
    );

    // The run stopped at well(2); nothing after it was requested.
    assert!(!report.root.find("eml://well(2)").unwrap().expanded);
    assert_eq!(report.requests, 4);
    assert_eq!(h.session.sent_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_wakes_blocked_wait() {
    let config = TraversalConfig::default().with_response_timeout(Duration::from_secs(10));
    let h = harness(WireVersion::V12, config, &["eml://well(1)/wellbore(11)"]);

    let traversal = Arc::clone(&h.traversal);
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        traversal.cancel_expand_all();
    });

    let started = Instant::now();
    let report = h.traversal.expand_all("eml://").await.unwrap();
    canceller.await.unwrap();

    assert_eq!(report.state, TraversalState::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(report.requests, 3);
    assert!(!report.root.find("eml://well(2)").unwrap().expanded);
    assert_eq!(h.session.sent_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_new_run_after_cancel_starts_fresh() {
    let h = harness(WireVersion::V11, fast(), &[]);
    h.traversal.cancel_expand_all();

    let report = h.traversal.expand_all("eml://").await.unwrap();
    assert_eq!(report.state, TraversalState::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_max_depth_bounds_recursion() {
    let h = harness(WireVersion::V11, fast().with_max_depth(2), &[]);
    let report = h.traversal.expand_all("eml://").await.unwrap();

    assert_eq!(report.state, TraversalState::Completed);
    // Root and the two wells with children; no wellbore is expanded.
    assert_eq!(report.requests, 3);
    assert!(
        !report
            .root
            .find("eml://well(1)/wellbore(11)")
            .unwrap()
            .expanded
    );
}

#[tokio::test(start_paused = true)]
async fn test_protocol_exception_leaves_node_empty_and_continues() {
    let h = harness(WireVersion::V11, fast(), &[]);
    let tree = well_tree();
    h.session.set_responder(move |request| {
        let uri = requested_uri(request).unwrap_or_default();
        if uri == "eml://well(1)" {
            return vec![(
                final_response(request, 1000),
                InboundMessage::ProtocolException {
                    error_code: 9,
                    message: "permission denied".into(),
                },
            )];
        }
        resources_response(request, tree.get(uri).cloned().unwrap_or_default())
    });

    let report = h.traversal.expand_all("eml://").await.unwrap();
    assert_eq!(report.state, TraversalState::Completed);
    let well1 = report.root.find("eml://well(1)").unwrap();
    assert!(well1.expanded);
    assert!(well1.children.is_empty());
    assert!(report.root.find("eml://well(2)").unwrap().expanded);
}

#[tokio::test(start_paused = true)]
async fn test_no_data_acknowledge_completes_node() {
    let h = harness(WireVersion::V12, fast(), &[]);
    h.session.set_responder(|request| {
        let header = MessageHeader::response(
            request.header.protocol,
            1001,
            request.header.message_id,
            MessageFlags::NONE.with_no_data(),
        );
        vec![(header, InboundMessage::Acknowledge)]
    });

    let report = h.traversal.expand_all("eml://").await.unwrap();
    assert_eq!(report.state, TraversalState::Completed);
    assert!(report.root.expanded);
    assert!(report.root.children.is_empty());
    assert_eq!(report.requests, 1);
}

// ============================================================================
// ON-DEMAND EXPANSION
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_expand_single_node() {
    let h = harness(WireVersion::V11, fast(), &["eml://well(3)"]);

    let expansion = h.traversal.expand("eml://well(2)").await.unwrap();
    let Expansion::Completed(children) = expansion else {
        panic!("expected children, got {expansion:?}");
    };
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].uri, "eml://well(2)/wellbore(21)");

    assert_eq!(
        h.traversal.expand("eml://well(3)").await.unwrap(),
        Expansion::TimedOut
    );
    assert_eq!(h.traversal.state(), TraversalState::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn test_expand_without_discovery_is_empty() {
    init_tracing();
    let session = Arc::new(RecordingSession::server(WireVersion::V11));
    let extender: Arc<dyn ProtocolExtender> = Arc::new(Etp11Extender::new(&session, Vec::new()));
    let traversal = DiscoveryTraversal::new(Arc::clone(&extender), fast());
    extender.register(CallbackTable::new()).unwrap();

    assert_eq!(
        traversal.expand("eml://").await.unwrap(),
        Expansion::Completed(Vec::new())
    );
    assert_eq!(session.sent_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_later_registration_keeps_response_feed() {
    let h = harness(WireVersion::V11, fast(), &[]);
    let extender = Arc::clone(&h.extender);
    let logged = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&logged);
    extender
        .register(CallbackTable::new().on_log(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

    // The peer rejects every request with a correlated, final exception.
    h.session.set_responder(|request| {
        vec![(
            final_response(request, 1000),
            InboundMessage::ProtocolException {
                error_code: 9,
                message: "no such resource".into(),
            },
        )]
    });

    let started = Instant::now();
    assert_eq!(
        h.traversal.expand("eml://").await.unwrap(),
        Expansion::Completed(Vec::new())
    );
    assert!(started.elapsed() < Duration::from_millis(50));
    assert_eq!(logged.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_applies_to_run_in_progress_only() {
    let config = TraversalConfig::default().with_response_timeout(Duration::from_secs(1));
    let h = harness(WireVersion::V11, config, &["eml://well(2)"]);

    let first = {
        let traversal = Arc::clone(&h.traversal);
        tokio::spawn(async move { traversal.expand_all("eml://").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = {
        let traversal = Arc::clone(&h.traversal);
        tokio::spawn(async move { traversal.expand_all("eml://").await })
    };
    tokio::task::yield_now().await;

    h.traversal.cancel_expand_all();

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.state, TraversalState::Cancelled);
    // The queued run took a fresh token and ran into the silent node.
    let second = second.await.unwrap().unwrap();
    assert_eq!(second.state, TraversalState::TimedOut);
    assert_eq!(second.requests, 4);
}

#[tokio::test(start_paused = true)]
async fn test_send_error_propagates() {
    let h = harness(WireVersion::V11, fast(), &[]);
    h.session.set_fail_sends(true);

    assert!(h.traversal.expand_all("eml://").await.is_err());
    assert_eq!(h.traversal.state(), TraversalState::Idle);
}

// ============================================================================
// END TO END
// ============================================================================

/// Client asks the catalog for defaults, registers, issues `GetResources` and
/// is released by a final response carrying the request's id.
#[tokio::test(start_paused = true)]
async fn test_discovery_round_trip_releases_waiter() {
    init_tracing();
    let session = Arc::new(RecordingSession::client(WireVersion::V11));
    let requests = ProtocolCatalog::for_version(WireVersion::V11).default_role_requests();
    let extender: Arc<dyn ProtocolExtender> = Arc::new(Etp11Extender::new(&session, requests));
    let traversal = DiscoveryTraversal::new(Arc::clone(&extender), TraversalConfig::default());
    extender.register(CallbackTable::new()).unwrap();

    // Answer from another task once the request is on the wire.
    let peer = Arc::clone(&session);
    let responder = tokio::spawn(async move {
        loop {
            if let Some(request) = peer.sent().into_iter().next() {
                let header = MessageHeader::response(
                    request.header.protocol,
                    2,
                    request.header.message_id,
                    MessageFlags::MULTI_PART.with_final_part(),
                );
                let message = InboundMessage::GetResourcesResponse {
                    resources: vec![Resource::new("eml://witsml14", "WITSML 1.4").with_children(3)],
                };
                assert!(peer.deliver(&header, &message));
                return request.header.message_id;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    });

    // Peer store on a client session means a local customer handler.
    assert!(session.registrations().contains(&Capability::new(
        Etp11Protocol::Discovery.id(),
        Role::Customer
    )));

    let expansion = traversal.expand("/").await.unwrap();
    let id = responder.await.unwrap();

    assert_ne!(id, 0);
    assert_eq!(requested_uri(&session.sent()[0]), Some("/"));
    let Expansion::Completed(children) = expansion else {
        panic!("expected the root resource, got {expansion:?}");
    };
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].uri, "eml://witsml14");
}

// ============================================================================
// CORRELATION
// ============================================================================

#[tokio::test]
async fn test_mixed_stream_groups_by_correlation_id() {
    let collector = ResponseCollector::<String>::new();
    collector.begin();
    let mut waiters: Vec<_> = (1..=3).map(|id| (id, collector.wait(id))).collect();

    let multi = MessageFlags::MULTI_PART;
    let last = multi.with_final_part();
    let stream = [
        (1, multi, "1a"),
        (2, multi, "2a"),
        (3, multi, "3a"),
        (1, multi, "1b"),
        (3, last, "3b"),
        (2, multi, "2b"),
        (1, last, "1c"),
        (2, last, "2c"),
    ];

    for (index, (id, flags, item)) in stream.iter().enumerate() {
        collector.accept(&MessageHeader::response(3, 2, *id, *flags), Some((*item).to_string()));

        // Only groups whose final message has arrived are released.
        let released: Vec<i64> = stream[..=index]
            .iter()
            .filter(|(_, f, _)| f.is_final_part())
            .map(|(id, _, _)| *id)
            .collect();
        for (id, waiter) in &mut waiters {
            if released.contains(id) {
                continue;
            }
            assert!(waiter.try_recv().is_err(), "group {id} released early");
        }
    }

    let mut groups = Vec::new();
    for (_, waiter) in waiters {
        groups.push(waiter.await.unwrap());
    }
    let items: Vec<Vec<String>> = groups.iter().map(|g| g.items.clone()).collect();
    assert_eq!(
        items,
        vec![
            vec!["1a".to_string(), "1b".into(), "1c".into()],
            vec!["2a".to_string(), "2b".into(), "2c".into()],
            vec!["3a".to_string(), "3b".into()],
        ]
    );

    // A push message with no correlation id never joins a group.
    let push = MessageHeader::response(1, 3, 0, MessageFlags::NONE);
    assert!(!collector.accept(&push, Some("data".into())));
    collector.finish();
}
