use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{conflict_on_unique, parse_column};
use crate::models::CounterOffer;
use crate::repositories::CounterOfferRepository;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, FromRow)]
struct CounterOfferRow {
    id: Uuid,
    quote_id: Uuid,
    driver_id: Uuid,
    proposed_price: i64,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
}

impl TryFrom<CounterOfferRow> for CounterOffer {
    type Error = AppError;

    fn try_from(row: CounterOfferRow) -> Result<Self, Self::Error> {
        Ok(CounterOffer {
            id: row.id,
            quote_id: row.quote_id,
            driver_id: row.driver_id,
            proposed_price: row.proposed_price,
            message: row.message,
            status: parse_column("status", &row.status)?,
            created_at: row.created_at,
            responded_at: row.responded_at,
        })
    }
}

pub struct PgCounterOfferRepository {
    pool: PgPool,
}

impl PgCounterOfferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterOfferRepository for PgCounterOfferRepository {
    async fn insert(&self, offer: &CounterOffer) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO counter_offers (id, quote_id, driver_id, proposed_price, message, status,
                created_at, responded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(offer.id)
        .bind(offer.quote_id)
        .bind(offer.driver_id)
        .bind(offer.proposed_price)
        .bind(&offer.message)
        .bind(offer.status.as_str())
        .bind(offer.created_at)
        .bind(offer.responded_at)
        .execute(&self.pool)
        .await
        .map_err(conflict_on_unique("driver already has a pending counter offer for this quote"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CounterOffer>> {
        let row = sqlx::query_as::<_, CounterOfferRow>("SELECT * FROM counter_offers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(CounterOffer::try_from).transpose()
    }

    async fn exists_pending(&self, quote_id: Uuid, driver_id: Uuid) -> AppResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM counter_offers
                WHERE quote_id = $1 AND driver_id = $2 AND status = 'PENDING'
            )
            "#,
        )
        .bind(quote_id)
        .bind(driver_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_by_quote(&self, quote_id: Uuid) -> AppResult<Vec<CounterOffer>> {
        let rows = sqlx::query_as::<_, CounterOfferRow>(
            "SELECT * FROM counter_offers WHERE quote_id = $1 ORDER BY created_at DESC",
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(CounterOffer::try_from).collect()
    }

    async fn find_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<CounterOffer>> {
        let rows = sqlx::query_as::<_, CounterOfferRow>(
            "SELECT * FROM counter_offers WHERE driver_id = $1 ORDER BY created_at DESC",
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(CounterOffer::try_from).collect()
    }

    async fn update_if_pending(&self, offer: &CounterOffer) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE counter_offers SET status = $2, responded_at = $3
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(offer.id)
        .bind(offer.status.as_str())
        .bind(offer.responded_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
