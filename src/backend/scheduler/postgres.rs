/**
 * PostgreSQL Club Store
 *
 * Runtime-checked sqlx queries against the tables created by
 * `migrations/0001_init.sql`. Instance rows are only ever inserted.
 */

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::auth::UserId;
use crate::backend::scheduler::store::{ClubStore, StoreError};
use crate::backend::scheduler::{Club, Metric, MetricInstance};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ClubStore for PgStore {
    async fn list_public_clubs(&self) -> Result<Vec<Club>, StoreError> {
        let clubs = sqlx::query_as::<_, Club>(
            "SELECT id, name, is_public FROM clubs WHERE is_public ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(clubs)
    }

    async fn list_all_clubs(&self) -> Result<Vec<Club>, StoreError> {
        let clubs = sqlx::query_as::<_, Club>("SELECT id, name, is_public FROM clubs ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(clubs)
    }

    async fn list_metrics_for_club(&self, club_id: Uuid) -> Result<Vec<Metric>, StoreError> {
        let metrics = sqlx::query_as::<_, Metric>(
            r#"SELECT id, club_id, "interval" FROM metrics WHERE club_id = $1 ORDER BY created_at"#,
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(metrics)
    }

    async fn latest_instance(&self, metric_id: Uuid) -> Result<Option<MetricInstance>, StoreError> {
        let instance = sqlx::query_as::<_, MetricInstance>(
            r#"
            SELECT id, metric_id, due_at, created_at
            FROM metric_instances
            WHERE metric_id = $1
            ORDER BY due_at DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(metric_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(instance)
    }

    async fn create_instance(
        &self,
        metric_id: Uuid,
        due_at: DateTime<Utc>,
    ) -> Result<MetricInstance, StoreError> {
        let instance = sqlx::query_as::<_, MetricInstance>(
            r#"
            INSERT INTO metric_instances (id, metric_id, due_at)
            VALUES ($1, $2, $3)
            RETURNING id, metric_id, due_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(metric_id)
        .bind(due_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(instance)
    }

    async fn list_club_member_ids(&self, club_id: Uuid) -> Result<Vec<UserId>, StoreError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM club_members WHERE club_id = $1 ORDER BY joined_at",
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
