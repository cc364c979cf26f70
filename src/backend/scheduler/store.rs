/**
 * Club Persistence Boundary
 *
 * The scheduler and the club notifier only need a handful of queries. They
 * are expressed as a trait so the server can run against PostgreSQL or the
 * in-process store, and tests can inject failures.
 */

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::UserId;
use crate::backend::scheduler::{Club, MemoryStore, Metric, MetricInstance, PgStore};

/// Data-access failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Queries the scheduler and notifier depend on
pub trait ClubStore: Send + Sync + 'static {
    fn list_public_clubs(&self) -> impl Future<Output = Result<Vec<Club>, StoreError>> + Send;

    fn list_all_clubs(&self) -> impl Future<Output = Result<Vec<Club>, StoreError>> + Send;

    fn list_metrics_for_club(
        &self,
        club_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Metric>, StoreError>> + Send;

    /// Latest instance of a metric, by due time then creation time
    fn latest_instance(
        &self,
        metric_id: Uuid,
    ) -> impl Future<Output = Result<Option<MetricInstance>, StoreError>> + Send;

    /// Append a new instance with a fresh id
    fn create_instance(
        &self,
        metric_id: Uuid,
        due_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<MetricInstance, StoreError>> + Send;

    fn list_club_member_ids(
        &self,
        club_id: Uuid,
    ) -> impl Future<Output = Result<Vec<UserId>, StoreError>> + Send;
}

/// Store selected at startup
#[derive(Debug, Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(Arc<MemoryStore>),
}

impl Store {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }
}

impl ClubStore for Store {
    async fn list_public_clubs(&self) -> Result<Vec<Club>, StoreError> {
        match self {
            Store::Postgres(store) => store.list_public_clubs().await,
            Store::Memory(store) => store.list_public_clubs().await,
        }
    }

    async fn list_all_clubs(&self) -> Result<Vec<Club>, StoreError> {
        match self {
            Store::Postgres(store) => store.list_all_clubs().await,
            Store::Memory(store) => store.list_all_clubs().await,
        }
    }

    async fn list_metrics_for_club(&self, club_id: Uuid) -> Result<Vec<Metric>, StoreError> {
        match self {
            Store::Postgres(store) => store.list_metrics_for_club(club_id).await,
            Store::Memory(store) => store.list_metrics_for_club(club_id).await,
        }
    }

    async fn latest_instance(&self, metric_id: Uuid) -> Result<Option<MetricInstance>, StoreError> {
        match self {
            Store::Postgres(store) => store.latest_instance(metric_id).await,
            Store::Memory(store) => store.latest_instance(metric_id).await,
        }
    }

    async fn create_instance(
        &self,
        metric_id: Uuid,
        due_at: DateTime<Utc>,
    ) -> Result<MetricInstance, StoreError> {
        match self {
            Store::Postgres(store) => store.create_instance(metric_id, due_at).await,
            Store::Memory(store) => store.create_instance(metric_id, due_at).await,
        }
    }

    async fn list_club_member_ids(&self, club_id: Uuid) -> Result<Vec<UserId>, StoreError> {
        match self {
            Store::Postgres(store) => store.list_club_member_ids(club_id).await,
            Store::Memory(store) => store.list_club_member_ids(club_id).await,
        }
    }
}

impl<T: ClubStore> ClubStore for Arc<T> {
    fn list_public_clubs(&self) -> impl Future<Output = Result<Vec<Club>, StoreError>> + Send {
        T::list_public_clubs(self)
    }

    fn list_all_clubs(&self) -> impl Future<Output = Result<Vec<Club>, StoreError>> + Send {
        T::list_all_clubs(self)
    }

    fn list_metrics_for_club(
        &self,
        club_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Metric>, StoreError>> + Send {
        T::list_metrics_for_club(self, club_id)
    }

    fn latest_instance(
        &self,
        metric_id: Uuid,
    ) -> impl Future<Output = Result<Option<MetricInstance>, StoreError>> + Send {
        T::latest_instance(self, metric_id)
    }

    fn create_instance(
        &self,
        metric_id: Uuid,
        due_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<MetricInstance, StoreError>> + Send {
        T::create_instance(self, metric_id, due_at)
    }

    fn list_club_member_ids(
        &self,
        club_id: Uuid,
    ) -> impl Future<Output = Result<Vec<UserId>, StoreError>> + Send {
        T::list_club_member_ids(self, club_id)
    }
}
