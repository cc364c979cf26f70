//! Rollover notices reaching connected club members

use chrono::{TimeDelta, Utc};
use std::sync::Arc;

use crate::common::{credential_for, MockConnection};
use task_social::backend::clock::ManualClock;
use task_social::backend::realtime::{Broadcaster, ClubNotifier, ConnectionRegistry, NotifyError};
use task_social::backend::scheduler::{MemoryStore, MetricScheduler};
use task_social::shared::{ClubScope, Envelope};

#[tokio::test]
async fn test_rollover_notice_reaches_connected_members_only() {
    let now = Utc::now();
    let store = Arc::new(MemoryStore::new());
    let club = store.insert_club("runners", true);
    let metric = store.insert_metric(club.id, "1h");
    store.insert_instance(metric.id, now - TimeDelta::seconds(5));
    store.add_member(club.id, "alice");
    store.add_member(club.id, "bob");

    let registry = Arc::new(ConnectionRegistry::new());
    let alice = MockConnection::new();
    let outsider = MockConnection::new();
    registry.add("alice", alice.clone(), credential_for("alice", TimeDelta::hours(1)));
    registry.add("mallory", outsider.clone(), credential_for("mallory", TimeDelta::hours(1)));

    let scheduler = MetricScheduler::new(store.clone(), Arc::new(ManualClock::new(now)), ClubScope::Public);
    let notifier = ClubNotifier::new(store.clone(), Broadcaster::new(Arc::clone(&registry)));

    let report = crate::assert_ok!(scheduler.tick().await);
    assert_eq!(notifier.notify_rollovers(&report).await, 1);

    let frames = alice.frames();
    assert_eq!(frames.len(), 1);
    let payload = crate::assert_envelope!(&frames[0], "metric_instance_created");
    assert_eq!(payload["metric_id"], metric.id.to_string());
    assert_eq!(payload["instance_id"], report.rollovers[0].instance.id.to_string());
    assert!(outsider.frames().is_empty());
}

#[tokio::test]
async fn test_notify_club_counts_partial_delivery() {
    let store = Arc::new(MemoryStore::new());
    let club = store.insert_club("runners", true);
    store.add_member(club.id, "alice");
    store.add_member(club.id, "bob");

    let registry = Arc::new(ConnectionRegistry::new());
    registry.add("alice", MockConnection::new(), credential_for("alice", TimeDelta::hours(1)));
    registry.add("bob", MockConnection::failing(), credential_for("bob", TimeDelta::hours(1)));
    let notifier = ClubNotifier::new(store, Broadcaster::new(Arc::clone(&registry)));

    let result = notifier
        .notify_club(club.id, &Envelope::notification("Heads up", "new week"))
        .await;

    match result {
        Err(NotifyError::Delivery(err)) => {
            assert_eq!(err.failed_recipients(), vec!["bob"]);
        }
        other => panic!("Expected delivery failure, got {other:?}"),
    }
    assert!(!registry.contains("bob"));
}

#[tokio::test]
async fn test_empty_report_sends_nothing() {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let alice = MockConnection::new();
    registry.add("alice", alice.clone(), credential_for("alice", TimeDelta::hours(1)));

    let scheduler = MetricScheduler::new(store.clone(), Arc::new(ManualClock::new(Utc::now())), ClubScope::All);
    let notifier = ClubNotifier::new(store, Broadcaster::new(registry));

    let report = crate::assert_ok!(scheduler.tick().await);
    assert_eq!(notifier.notify_rollovers(&report).await, 0);
    assert!(alice.frames().is_empty());
}
