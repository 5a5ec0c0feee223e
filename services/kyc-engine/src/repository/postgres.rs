//! PostgreSQL-backed repository.
//!
//! Every entity table has the same shape: the whole entity as a JSONB `body`
//! plus the columns the queries filter and sort on (`owner_id`, `is_primary`,
//! `created_at`). Table names come from `Entity::TABLE` constants and are
//! never user-controlled.

use super::{Page, Repository, RepositoryProvider};
use crate::errors::Result;
use crate::metrics::REPOSITORY_QUERY_DURATION;
use crate::models::Entity;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> PgRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        PgRepository {
            pool,
            _entity: PhantomData,
        }
    }

    fn timer(operation: &str) -> prometheus::HistogramTimer {
        REPOSITORY_QUERY_DURATION
            .with_label_values(&[E::TABLE, operation])
            .start_timer()
    }

    fn decode(row: PgRow) -> Result<E> {
        let Json(entity) = row.try_get::<Json<E>, _>("body")?;
        Ok(entity)
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for PgRepository<E> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>> {
        let _timer = Self::timer("find_by_id");
        let sql = format!("SELECT body FROM {} WHERE id = $1", E::TABLE);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::decode).transpose()
    }

    async fn find_all(&self, page: Page) -> Result<Vec<E>> {
        let _timer = Self::timer("find_all");
        let sql = format!(
            "SELECT body FROM {} ORDER BY created_at, id LIMIT $1 OFFSET $2",
            E::TABLE
        );

        let rows = sqlx::query(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::decode).collect()
    }

    async fn find_by_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<E>> {
        let _timer = Self::timer("find_by_owner");
        let sql = format!(
            "SELECT body FROM {} WHERE owner_id = $1 ORDER BY created_at, id LIMIT $2 OFFSET $3",
            E::TABLE
        );

        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::decode).collect()
    }

    async fn find_primary(&self, owner_id: Uuid) -> Result<Option<E>> {
        let _timer = Self::timer("find_primary");
        let sql = format!(
            "SELECT body FROM {} WHERE owner_id = $1 AND is_primary LIMIT 1",
            E::TABLE
        );

        let row = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::decode).transpose()
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64> {
        let _timer = Self::timer("count_by_owner");
        let sql = format!("SELECT COUNT(*) FROM {} WHERE owner_id = $1", E::TABLE);

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn save(&self, entity: &E) -> Result<()> {
        let _timer = Self::timer("save");
        let sql = upsert_sql(E::TABLE);

        sqlx::query(&sql)
            .bind(entity.id())
            .bind(entity.owner_id())
            .bind(entity.is_primary())
            .bind(Json(entity))
            .bind(entity.created_at())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn save_primary(&self, entity: &E) -> Result<Vec<Uuid>> {
        let _timer = Self::timer("save_primary");
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Serialise concurrent primary swaps for the same owner
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}:{}", E::TABLE, entity.owner_id()))
            .execute(&mut *tx)
            .await?;

        let demote_sql = format!(
            r#"
            UPDATE {}
            SET is_primary = FALSE,
                body = jsonb_set(jsonb_set(body, '{{is_primary}}', 'false'::jsonb),
                                 '{{updated_at}}', to_jsonb($3::timestamptz)),
                updated_at = $3
            WHERE owner_id = $1 AND is_primary AND id <> $2
            RETURNING id
            "#,
            E::TABLE
        );

        let demoted: Vec<Uuid> = sqlx::query_scalar(&demote_sql)
            .bind(entity.owner_id())
            .bind(entity.id())
            .bind(now)
            .fetch_all(&mut *tx)
            .await?;

        sqlx::query(&upsert_sql(E::TABLE))
            .bind(entity.id())
            .bind(entity.owner_id())
            .bind(entity.is_primary())
            .bind(Json(entity))
            .bind(entity.created_at())
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            "Saved primary {} {} (demoted {})",
            E::KIND,
            entity.id(),
            demoted.len()
        );
        Ok(demoted)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let _timer = Self::timer("delete_by_id");
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);

        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}

fn upsert_sql(table: &str) -> String {
    format!(
        r#"
        INSERT INTO {} (id, owner_id, is_primary, body, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE SET
            owner_id = EXCLUDED.owner_id,
            is_primary = EXCLUDED.is_primary,
            body = EXCLUDED.body,
            updated_at = EXCLUDED.updated_at
        "#,
        table
    )
}

#[derive(Clone)]
pub struct PostgresProvider {
    pool: PgPool,
}

impl PostgresProvider {
    pub fn new(pool: PgPool) -> Self {
        PostgresProvider { pool }
    }
}

impl RepositoryProvider for PostgresProvider {
    fn repository<E: Entity>(&self) -> Arc<dyn Repository<E>> {
        Arc::new(PgRepository::<E>::new(self.pool.clone()))
    }
}
