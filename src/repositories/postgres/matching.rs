use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{conflict_on_unique, parse_column};
use crate::models::{Match, QuoteStatus};
use crate::repositories::MatchRepository;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, FromRow)]
struct MatchRow {
    id: Uuid,
    quote_id: Uuid,
    driver_id: Option<Uuid>,
    accepted: bool,
    accepted_at: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MatchRow> for Match {
    type Error = AppError;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        Ok(Match {
            id: row.id,
            quote_id: row.quote_id,
            driver_id: row.driver_id,
            accepted: row.accepted,
            accepted_at: row.accepted_at,
            status: parse_column("status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_matches(rows: Vec<MatchRow>) -> AppResult<Vec<Match>> {
    rows.into_iter().map(Match::try_from).collect()
}

pub struct PgMatchRepository {
    pool: PgPool,
}

impl PgMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchRepository for PgMatchRepository {
    async fn insert(&self, record: &Match) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO matches (id, quote_id, driver_id, accepted, accepted_at, status,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.quote_id)
        .bind(record.driver_id)
        .bind(record.accepted)
        .bind(record.accepted_at)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(conflict_on_unique("quote already has an active match"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Match>> {
        let row = sqlx::query_as::<_, MatchRow>("SELECT * FROM matches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Match::try_from).transpose()
    }

    async fn find_active_by_quote(&self, quote_id: Uuid) -> AppResult<Option<Match>> {
        let row = sqlx::query_as::<_, MatchRow>(
            "SELECT * FROM matches WHERE quote_id = $1 AND status <> 'CANCELLED'",
        )
        .bind(quote_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Match::try_from).transpose()
    }

    async fn find_open(&self) -> AppResult<Vec<Match>> {
        let rows = sqlx::query_as::<_, MatchRow>(
            "SELECT * FROM matches WHERE accepted = FALSE AND status = 'READY' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        into_matches(rows)
    }

    async fn find_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<Match>> {
        let rows = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT * FROM matches
            WHERE driver_id = $1 AND status <> 'CANCELLED'
            ORDER BY created_at DESC
            "#,
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;
        into_matches(rows)
    }

    async fn find_by_shipper(&self, shipper_id: Uuid) -> AppResult<Vec<Match>> {
        let rows = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT m.* FROM matches m
            JOIN quotes q ON q.id = m.quote_id
            WHERE q.shipper_id = $1 AND m.status <> 'CANCELLED'
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(shipper_id)
        .fetch_all(&self.pool)
        .await?;
        into_matches(rows)
    }

    async fn compare_and_update(
        &self,
        expected: &Match,
        updated: &Match,
        quote_status: Option<QuoteStatus>,
    ) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE matches
            SET driver_id = $2, accepted = $3, accepted_at = $4, status = $5, updated_at = $6
            WHERE id = $1 AND status = $7 AND accepted = $8
            "#,
        )
        .bind(updated.id)
        .bind(updated.driver_id)
        .bind(updated.accepted)
        .bind(updated.accepted_at)
        .bind(updated.status.as_str())
        .bind(updated.updated_at)
        .bind(expected.status.as_str())
        .bind(expected.accepted)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(status) = quote_status {
            sqlx::query("UPDATE quotes SET status = $2, updated_at = $3 WHERE id = $1")
                .bind(updated.quote_id)
                .bind(status.as_str())
                .bind(updated.updated_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
