use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::parse_column;
use crate::models::SurchargeOptionRecord;
use crate::pricing::VehicleClass;
use crate::repositories::SurchargeOptionRepository;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, FromRow)]
struct SurchargeOptionRow {
    id: Uuid,
    code: String,
    option_type: String,
    min_add_won: Option<i64>,
    max_add_won: Option<i64>,
    min_multiplier: Option<Decimal>,
    max_multiplier: Option<Decimal>,
    fixed_add_won: Option<i64>,
    vehicle_rates: Json<HashMap<VehicleClass, i64>>,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SurchargeOptionRow> for SurchargeOptionRecord {
    type Error = AppError;

    fn try_from(row: SurchargeOptionRow) -> Result<Self, Self::Error> {
        Ok(SurchargeOptionRecord {
            id: row.id,
            code: row.code,
            option_type: parse_column("option_type", &row.option_type)?,
            min_add_won: row.min_add_won,
            max_add_won: row.max_add_won,
            min_multiplier: row.min_multiplier,
            max_multiplier: row.max_multiplier,
            fixed_add_won: row.fixed_add_won,
            vehicle_rates: row.vehicle_rates.0,
            enabled: row.enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgSurchargeOptionRepository {
    pool: PgPool,
}

impl PgSurchargeOptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SurchargeOptionRepository for PgSurchargeOptionRepository {
    async fn upsert(&self, record: &SurchargeOptionRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO surcharge_options (id, code, option_type, min_add_won, max_add_won,
                min_multiplier, max_multiplier, fixed_add_won, vehicle_rates, enabled,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (code) DO UPDATE SET
                option_type = EXCLUDED.option_type,
                min_add_won = EXCLUDED.min_add_won,
                max_add_won = EXCLUDED.max_add_won,
                min_multiplier = EXCLUDED.min_multiplier,
                max_multiplier = EXCLUDED.max_multiplier,
                fixed_add_won = EXCLUDED.fixed_add_won,
                vehicle_rates = EXCLUDED.vehicle_rates,
                enabled = EXCLUDED.enabled,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.id)
        .bind(&record.code)
        .bind(record.option_type.as_str())
        .bind(record.min_add_won)
        .bind(record.max_add_won)
        .bind(record.min_multiplier)
        .bind(record.max_multiplier)
        .bind(record.fixed_add_won)
        .bind(Json(&record.vehicle_rates))
        .bind(record.enabled)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_codes(&self, codes: &[String]) -> AppResult<Vec<SurchargeOptionRecord>> {
        let rows = sqlx::query_as::<_, SurchargeOptionRow>(
            "SELECT * FROM surcharge_options WHERE code = ANY($1)",
        )
        .bind(codes)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SurchargeOptionRecord::try_from).collect()
    }

    async fn find_all(&self) -> AppResult<Vec<SurchargeOptionRecord>> {
        let rows = sqlx::query_as::<_, SurchargeOptionRow>(
            "SELECT * FROM surcharge_options ORDER BY code ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SurchargeOptionRecord::try_from).collect()
    }
}
