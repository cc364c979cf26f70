//! In-process club store.
//!
//! Backs the server when no database is configured, and the tests. Instances
//! are kept per metric in insertion order.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::backend::auth::UserId;
use crate::backend::scheduler::store::{ClubStore, StoreError};
use crate::backend::scheduler::{Club, Metric, MetricInstance};

#[derive(Debug, Default)]
struct MemoryData {
    clubs: Vec<Club>,
    metrics: Vec<Metric>,
    instances: HashMap<Uuid, Vec<MetricInstance>>,
    members: HashMap<Uuid, Vec<UserId>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, MemoryData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_club(&self, name: impl Into<String>, is_public: bool) -> Club {
        let club = Club {
            id: Uuid::new_v4(),
            name: name.into(),
            is_public,
        };
        self.data().clubs.push(club.clone());
        club
    }

    pub fn insert_metric(&self, club_id: Uuid, interval: impl Into<String>) -> Metric {
        let metric = Metric {
            id: Uuid::new_v4(),
            club_id,
            interval: interval.into(),
        };
        self.data().metrics.push(metric.clone());
        metric
    }

    /// Record an instance directly, bypassing the scheduler
    pub fn insert_instance(&self, metric_id: Uuid, due_at: DateTime<Utc>) -> MetricInstance {
        let instance = MetricInstance {
            id: Uuid::new_v4(),
            metric_id,
            due_at,
            created_at: Utc::now(),
        };
        self.data()
            .instances
            .entry(metric_id)
            .or_default()
            .push(instance.clone());
        instance
    }

    pub fn add_member(&self, club_id: Uuid, user_id: impl Into<UserId>) {
        self.data().members.entry(club_id).or_default().push(user_id.into());
    }

    /// All instances of a metric, oldest first
    pub fn instances(&self, metric_id: Uuid) -> Vec<MetricInstance> {
        self.data().instances.get(&metric_id).cloned().unwrap_or_default()
    }

    fn latest(&self, metric_id: Uuid) -> Option<MetricInstance> {
        let data = self.data();
        let instances = data.instances.get(&metric_id)?;
        // max_by_key keeps the last of equal keys, i.e. the most recently appended
        instances.iter().max_by_key(|i| i.due_at).cloned()
    }
}

impl ClubStore for MemoryStore {
    async fn list_public_clubs(&self) -> Result<Vec<Club>, StoreError> {
        Ok(self.data().clubs.iter().filter(|c| c.is_public).cloned().collect())
    }

    async fn list_all_clubs(&self) -> Result<Vec<Club>, StoreError> {
        Ok(self.data().clubs.clone())
    }

    async fn list_metrics_for_club(&self, club_id: Uuid) -> Result<Vec<Metric>, StoreError> {
        Ok(self
            .data()
            .metrics
            .iter()
            .filter(|m| m.club_id == club_id)
            .cloned()
            .collect())
    }

    async fn latest_instance(&self, metric_id: Uuid) -> Result<Option<MetricInstance>, StoreError> {
        Ok(self.latest(metric_id))
    }

    async fn create_instance(
        &self,
        metric_id: Uuid,
        due_at: DateTime<Utc>,
    ) -> Result<MetricInstance, StoreError> {
        let known = self.data().metrics.iter().any(|m| m.id == metric_id);
        if !known {
            return Err(StoreError::NotFound {
                entity: "metric",
                id: metric_id,
            });
        }
        Ok(self.insert_instance(metric_id, due_at))
    }

    async fn list_club_member_ids(&self, club_id: Uuid) -> Result<Vec<UserId>, StoreError> {
        Ok(self.data().members.get(&club_id).cloned().unwrap_or_default())
    }
}
