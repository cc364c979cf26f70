/**
 * Metric Rollover Tick
 *
 * One tick scans every club in scope, and for each metric compares the
 * latest instance's due time with a single `now` taken at the start of the
 * tick. An instance is expired once `now >= due_at`; an expired metric gets
 * a new instance due at `now + interval`. A metric with no instance yet is
 * seeded the same way.
 *
 * # Failure Isolation
 *
 * Each club's metric listing and each metric's rollover are independent
 * units. A failure is recorded and the scan moves on, so a malformed
 * interval or a flaky query only holds back the metric it concerns. Only a
 * failure to list clubs ends a tick early, since there is nothing left to
 * scan.
 *
 * # Overlap
 *
 * Ticks on the same scheduler are serialized. Without that, two overlapping
 * ticks could both observe an expired instance and both append a
 * successor.
 */

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::clock::Clock;
use crate::backend::scheduler::store::{ClubStore, StoreError};
use crate::backend::scheduler::{Metric, MetricInstance};
use crate::shared::interval::{parse_interval, IntervalError};
use crate::shared::ClubScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverKind {
    /// The previous instance was due at the given instant
    Expired { previous_due_at: DateTime<Utc> },
    /// The metric had no instance yet
    Seeded,
}

/// A new instance appended during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollover {
    pub club_id: Uuid,
    pub metric_id: Uuid,
    pub kind: RolloverKind,
    pub instance: MetricInstance,
}

/// What a tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Instant every expiry in the tick was judged against
    pub now: DateTime<Utc>,
    pub clubs_scanned: usize,
    pub metrics_checked: usize,
    pub rollovers: Vec<Rollover>,
}

impl TickReport {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            clubs_scanned: 0,
            metrics_checked: 0,
            rollovers: Vec::new(),
        }
    }
}

/// One unit of work that failed during a tick
#[derive(Debug, Error)]
pub enum TickFailure {
    #[error("club {club_id}: listing metrics failed: {error}")]
    ListMetrics { club_id: Uuid, error: StoreError },

    #[error("metric {metric_id}: fetching latest instance failed: {error}")]
    LatestInstance { metric_id: Uuid, error: StoreError },

    #[error("metric {metric_id}: invalid interval {interval:?}: {error}")]
    InvalidInterval {
        metric_id: Uuid,
        interval: String,
        error: IntervalError,
    },

    #[error("metric {metric_id}: creating instance failed: {error}")]
    CreateInstance { metric_id: Uuid, error: StoreError },
}

#[derive(Debug, Error)]
pub enum TickError {
    /// Clubs could not be listed; nothing was scanned
    #[error("listing clubs failed: {0}")]
    ListClubs(StoreError),

    /// The scan completed but some units failed
    #[error("{} failure(s) during tick, {} rollover(s) recorded", failures.len(), report.rollovers.len())]
    Partial {
        report: TickReport,
        failures: Vec<TickFailure>,
    },
}

impl TickError {
    /// Partial report, if the scan got past listing clubs
    pub fn report(&self) -> Option<&TickReport> {
        match self {
            TickError::ListClubs(_) => None,
            TickError::Partial { report, .. } => Some(report),
        }
    }

    pub fn failures(&self) -> &[TickFailure] {
        match self {
            TickError::ListClubs(_) => &[],
            TickError::Partial { failures, .. } => failures,
        }
    }
}

pub struct MetricScheduler<S> {
    store: S,
    clock: Arc<dyn Clock>,
    scope: ClubScope,
    tick_guard: Mutex<()>,
}

impl<S: ClubStore> MetricScheduler<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>, scope: ClubScope) -> Self {
        Self {
            store,
            clock,
            scope,
            tick_guard: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scope(&self) -> ClubScope {
        self.scope
    }

    /// Run one rollover pass
    pub async fn tick(&self) -> Result<TickReport, TickError> {
        let _guard = self.tick_guard.lock().await;
        let now = self.clock.now();

        let clubs = match self.scope {
            ClubScope::Public => self.store.list_public_clubs().await,
            ClubScope::All => self.store.list_all_clubs().await,
        }
        .map_err(TickError::ListClubs)?;

        let mut report = TickReport::new(now);
        let mut failures = Vec::new();

        for club in &clubs {
            report.clubs_scanned += 1;

            let metrics = match self.store.list_metrics_for_club(club.id).await {
                Ok(metrics) => metrics,
                Err(error) => {
                    failures.push(TickFailure::ListMetrics {
                        club_id: club.id,
                        error,
                    });
                    continue;
                }
            };

            for metric in &metrics {
                report.metrics_checked += 1;
                match self.advance(metric, now).await {
                    Ok(Some(rollover)) => report.rollovers.push(rollover),
                    Ok(None) => {}
                    Err(failure) => failures.push(failure),
                }
            }
        }

        tracing::debug!(
            clubs = report.clubs_scanned,
            metrics = report.metrics_checked,
            rollovers = report.rollovers.len(),
            failures = failures.len(),
            "[Scheduler] Tick finished"
        );

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(TickError::Partial { report, failures })
        }
    }

    async fn advance(&self, metric: &Metric, now: DateTime<Utc>) -> Result<Option<Rollover>, TickFailure> {
        let latest = self
            .store
            .latest_instance(metric.id)
            .await
            .map_err(|error| TickFailure::LatestInstance {
                metric_id: metric.id,
                error,
            })?;

        let kind = match &latest {
            Some(instance) if !instance.is_expired_at(now) => return Ok(None),
            Some(instance) => RolloverKind::Expired {
                previous_due_at: instance.due_at,
            },
            None => RolloverKind::Seeded,
        };

        let invalid = |error| TickFailure::InvalidInterval {
            metric_id: metric.id,
            interval: metric.interval.clone(),
            error,
        };
        let interval = parse_interval(&metric.interval).map_err(invalid)?;
        let due_at = now
            .checked_add_signed(interval)
            .ok_or_else(|| invalid(IntervalError::Overflow(metric.interval.clone())))?;

        let instance = self
            .store
            .create_instance(metric.id, due_at)
            .await
            .map_err(|error| TickFailure::CreateInstance {
                metric_id: metric.id,
                error,
            })?;

        tracing::info!(
            club_id = %metric.club_id,
            metric_id = %metric.id,
            instance_id = %instance.id,
            due_at = %instance.due_at,
            seeded = matches!(kind, RolloverKind::Seeded),
            "[Scheduler] Metric rolled over"
        );

        Ok(Some(Rollover {
            club_id: metric.club_id,
            metric_id: metric.id,
            kind,
            instance,
        }))
    }

    /// Tick every `interval`, handing each report (including partial ones)
    /// to `on_report`
    ///
    /// A failed tick is logged and the loop carries on; the next tick
    /// re-discovers whatever is still expired.
    pub fn spawn<F, Fut>(self: Arc<Self>, interval: Duration, on_report: F) -> JoinHandle<()>
    where
        F: Fn(TickReport) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            tracing::info!(
                interval_secs = interval.as_secs(),
                scope = ?self.scope,
                "[Scheduler] Started"
            );

            loop {
                ticker.tick().await;
                match self.tick().await {
                    Ok(report) => on_report(report).await,
                    Err(TickError::Partial { report, failures }) => {
                        for failure in &failures {
                            tracing::error!(error = %failure, "[Scheduler] Rollover failed");
                        }
                        on_report(report).await;
                    }
                    Err(err) => tracing::error!(error = %err, "[Scheduler] Tick aborted"),
                }
            }
        })
    }
}
