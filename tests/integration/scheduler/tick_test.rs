//! Metric scheduler integration tests

use assert_matches::assert_matches;
use chrono::{TimeDelta, Utc};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use crate::common::FaultyStore;
use task_social::backend::clock::{ManualClock, SystemClock};
use task_social::backend::scheduler::{
    MemoryStore, MetricScheduler, RolloverKind, TickError, TickFailure,
};
use task_social::shared::ClubScope;

#[tokio::test]
async fn test_one_hour_metric_overdue_by_a_second() {
    let now = Utc::now();
    let store = Arc::new(MemoryStore::new());
    let club = store.insert_club("early risers", true);
    let metric = store.insert_metric(club.id, "1h");
    store.insert_instance(metric.id, now - TimeDelta::seconds(1));
    let scheduler = MetricScheduler::new(store.clone(), Arc::new(ManualClock::new(now)), ClubScope::Public);

    let first = crate::assert_ok!(scheduler.tick().await);
    assert_eq!(first.rollovers.len(), 1);
    assert_eq!(first.rollovers[0].instance.due_at, now + TimeDelta::hours(1));

    let second = crate::assert_ok!(scheduler.tick().await);
    assert!(second.rollovers.is_empty());
    assert_eq!(store.instances(metric.id).len(), 2);
}

#[tokio::test]
async fn test_rollover_with_system_clock_lands_an_hour_out() {
    let store = Arc::new(MemoryStore::new());
    let club = store.insert_club("early risers", true);
    let metric = store.insert_metric(club.id, "1h");
    store.insert_instance(metric.id, Utc::now() - TimeDelta::seconds(1));
    let scheduler = MetricScheduler::new(store.clone(), Arc::new(SystemClock), ClubScope::Public);

    let before = Utc::now();
    let report = crate::assert_ok!(scheduler.tick().await);
    let after = Utc::now();

    let due = report.rollovers[0].instance.due_at;
    assert!(due >= before + TimeDelta::hours(1));
    assert!(due <= after + TimeDelta::hours(1));
}

#[tokio::test]
async fn test_repeated_ticks_advance_monotonically() {
    let start = Utc::now();
    let clock = Arc::new(ManualClock::new(start));
    let store = Arc::new(MemoryStore::new());
    let club = store.insert_club("readers", true);
    let metric = store.insert_metric(club.id, "24h");
    store.insert_instance(metric.id, start);
    let scheduler = MetricScheduler::new(store.clone(), clock.clone(), ClubScope::Public);

    for _ in 0..3 {
        crate::assert_ok!(scheduler.tick().await);
        clock.advance(TimeDelta::hours(25));
    }

    let dues: Vec<_> = store.instances(metric.id).iter().map(|i| i.due_at).collect();
    assert_eq!(dues.len(), 4);
    assert!(dues.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_earlier_club_rollover_survives_later_club_failure() {
    let now = Utc::now();
    let store = Arc::new(FaultyStore::new());
    let club_a = store.inner.insert_club("a", true);
    let club_b = store.inner.insert_club("b", true);
    let metric_a = store.inner.insert_metric(club_a.id, "1h");
    let metric_b = store.inner.insert_metric(club_b.id, "1h");
    store.inner.insert_instance(metric_a.id, now - TimeDelta::minutes(1));
    store.inner.insert_instance(metric_b.id, now - TimeDelta::minutes(1));
    store.fail_metrics_for(club_b.id);
    let scheduler = MetricScheduler::new(store.clone(), Arc::new(ManualClock::new(now)), ClubScope::Public);

    let err = scheduler.tick().await.unwrap_err();

    assert_matches!(&err, TickError::Partial { failures, .. } if failures.len() == 1);
    assert_matches!(&err.failures()[0], TickFailure::ListMetrics { club_id, .. } if *club_id == club_b.id);
    assert_eq!(err.report().map(|r| r.clubs_scanned), Some(2));
    assert_eq!(store.inner.instances(metric_a.id).len(), 2);
    assert_eq!(store.inner.instances(metric_b.id).len(), 1);
}

#[tokio::test]
async fn test_club_listing_failure_ends_tick() {
    let store = Arc::new(FaultyStore::new());
    store.fail_list_clubs();
    let scheduler = MetricScheduler::new(store, Arc::new(SystemClock), ClubScope::All);

    let err = scheduler.tick().await.unwrap_err();
    assert_matches!(&err, TickError::ListClubs(_));
    assert!(err.report().is_none());
}

#[tokio::test]
async fn test_failed_instance_lookup_is_isolated() {
    let now = Utc::now();
    let store = Arc::new(FaultyStore::new());
    let club = store.inner.insert_club("a", true);
    let flaky = store.inner.insert_metric(club.id, "1h");
    let steady = store.inner.insert_metric(club.id, "2h");
    store.inner.insert_instance(steady.id, now);
    store.fail_latest_for(flaky.id);
    let scheduler = MetricScheduler::new(store.clone(), Arc::new(ManualClock::new(now)), ClubScope::Public);

    let err = scheduler.tick().await.unwrap_err();

    assert_matches!(&err.failures()[0], TickFailure::LatestInstance { metric_id, .. } if *metric_id == flaky.id);
    let report = err.report().unwrap();
    assert_eq!(report.metrics_checked, 2);
    assert_eq!(report.rollovers.len(), 1);
    assert_eq!(
        report.rollovers[0].kind,
        RolloverKind::Expired { previous_due_at: now }
    );
}

#[tokio::test(start_paused = true)]
async fn test_spawned_scheduler_reports_each_tick() {
    let now = Utc::now();
    let store = Arc::new(MemoryStore::new());
    let club = store.insert_club("a", true);
    let metric = store.insert_metric(club.id, "1h");
    store.insert_instance(metric.id, now - TimeDelta::seconds(1));
    let scheduler = Arc::new(MetricScheduler::new(
        store.clone(),
        Arc::new(ManualClock::new(now)),
        ClubScope::Public,
    ));

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let task = scheduler.spawn(Duration::from_secs(60), move |report| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(report.rollovers.len());
        }
    });

    assert_eq!(rx.recv().await, Some(1));
    assert_eq!(rx.recv().await, Some(0));
    task.abort();

    assert_eq!(store.instances(metric.id).len(), 2);
}
