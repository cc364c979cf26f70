//! Metric Scheduler Module
//!
//! Clubs track recurring metrics. Each metric has a chain of instances, one
//! per round, and only the latest instance is current. The scheduler rolls
//! a metric forward by appending a new instance once the current one is
//! due; instances are never edited in place.
//!
//! # Module Structure
//!
//! ```text
//! scheduler/
//! ├── mod.rs       - Club, Metric and MetricInstance records
//! ├── store.rs     - ClubStore trait, StoreError, Store dispatch
//! ├── memory.rs    - In-process store
//! ├── postgres.rs  - sqlx/PostgreSQL store
//! └── tick.rs      - MetricScheduler and tick reports
//! ```

pub mod memory;
pub mod postgres;
pub mod store;
pub mod tick;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{ClubStore, Store, StoreError};
pub use tick::{MetricScheduler, Rollover, RolloverKind, TickError, TickFailure, TickReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub is_public: bool,
}

/// A recurring metric tracked by a club
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Metric {
    pub id: Uuid,
    pub club_id: Uuid,
    /// Round length as a duration expression, e.g. `"168h"`
    pub interval: String,
}

/// One round of a metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MetricInstance {
    pub id: Uuid,
    pub metric_id: Uuid,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl MetricInstance {
    /// Expired iff `now >= due_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.due_at
    }
}
