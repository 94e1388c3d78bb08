use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::parse_column;
use crate::models::{Quote, QuoteChecklistSelection, QuoteStop};
use crate::repositories::QuoteRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Debug, FromRow)]
struct QuoteRow {
    id: Uuid,
    shipper_id: Uuid,
    origin_address: String,
    origin_lat: Option<f64>,
    origin_lng: Option<f64>,
    destination_address: String,
    destination_lat: Option<f64>,
    destination_lng: Option<f64>,
    distance_km: i32,
    weight_kg: Option<i32>,
    volume_cbm: Option<i32>,
    vehicle_class: String,
    vehicle_body_type: Option<String>,
    surcharge_codes: Vec<String>,
    cargo_type: Option<String>,
    cargo_desc: Option<String>,
    base_price: i64,
    extra_price: i64,
    final_price: i64,
    desired_price: i64,
    allow_combine: bool,
    load_method: String,
    unload_method: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QuoteRow> for Quote {
    type Error = AppError;

    fn try_from(row: QuoteRow) -> Result<Self, Self::Error> {
        Ok(Quote {
            id: row.id,
            shipper_id: row.shipper_id,
            origin_address: row.origin_address,
            origin_lat: row.origin_lat,
            origin_lng: row.origin_lng,
            destination_address: row.destination_address,
            destination_lat: row.destination_lat,
            destination_lng: row.destination_lng,
            distance_km: row.distance_km,
            weight_kg: row.weight_kg,
            volume_cbm: row.volume_cbm,
            vehicle_class: parse_column("vehicle_class", &row.vehicle_class)?,
            vehicle_body_type: row.vehicle_body_type,
            surcharge_codes: row.surcharge_codes,
            cargo_type: row.cargo_type,
            cargo_desc: row.cargo_desc,
            base_price: row.base_price,
            extra_price: row.extra_price,
            final_price: row.final_price,
            desired_price: row.desired_price,
            allow_combine: row.allow_combine,
            load_method: parse_column("load_method", &row.load_method)?,
            unload_method: parse_column("unload_method", &row.unload_method)?,
            status: parse_column("status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct StopRow {
    id: Uuid,
    quote_id: Uuid,
    seq: i32,
    address: String,
    lat: Option<f64>,
    lng: Option<f64>,
    contact_name: Option<String>,
    contact_phone: Option<String>,
    dept_name: Option<String>,
    manager_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<StopRow> for QuoteStop {
    fn from(row: StopRow) -> Self {
        QuoteStop {
            id: row.id,
            quote_id: row.quote_id,
            seq: row.seq,
            address: row.address,
            lat: row.lat,
            lng: row.lng,
            contact_name: row.contact_name,
            contact_phone: row.contact_phone,
            dept_name: row.dept_name,
            manager_name: row.manager_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SelectionRow {
    id: Uuid,
    quote_id: Uuid,
    checklist_item_id: Uuid,
    extra_input: Option<String>,
    extra_fee: i64,
    created_at: DateTime<Utc>,
}

impl From<SelectionRow> for QuoteChecklistSelection {
    fn from(row: SelectionRow) -> Self {
        QuoteChecklistSelection {
            id: row.id,
            quote_id: row.quote_id,
            checklist_item_id: row.checklist_item_id,
            extra_input: row.extra_input,
            extra_fee: row.extra_fee,
            created_at: row.created_at,
        }
    }
}

pub struct PgQuoteRepository {
    pool: PgPool,
}

impl PgQuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_children(
        tx: &mut Transaction<'_, Postgres>,
        stops: &[QuoteStop],
        checklist: &[QuoteChecklistSelection],
    ) -> AppResult<()> {
        for stop in stops {
            sqlx::query(
                r#"
                INSERT INTO quote_stops (id, quote_id, seq, address, lat, lng, contact_name,
                    contact_phone, dept_name, manager_name, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(stop.id)
            .bind(stop.quote_id)
            .bind(stop.seq)
            .bind(&stop.address)
            .bind(stop.lat)
            .bind(stop.lng)
            .bind(&stop.contact_name)
            .bind(&stop.contact_phone)
            .bind(&stop.dept_name)
            .bind(&stop.manager_name)
            .bind(stop.created_at)
            .execute(&mut **tx)
            .await?;
        }

        for selection in checklist {
            sqlx::query(
                r#"
                INSERT INTO quote_checklist_items (id, quote_id, checklist_item_id, extra_input,
                    extra_fee, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(selection.id)
            .bind(selection.quote_id)
            .bind(selection.checklist_item_id)
            .bind(&selection.extra_input)
            .bind(selection.extra_fee)
            .bind(selection.created_at)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl QuoteRepository for PgQuoteRepository {
    async fn insert(
        &self,
        quote: &Quote,
        stops: &[QuoteStop],
        checklist: &[QuoteChecklistSelection],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quotes (id, shipper_id, origin_address, origin_lat, origin_lng,
                destination_address, destination_lat, destination_lng, distance_km, weight_kg,
                volume_cbm, vehicle_class, vehicle_body_type, surcharge_codes, cargo_type, cargo_desc,
                base_price, extra_price, final_price, desired_price, allow_combine, load_method,
                unload_method, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26)
            "#,
        )
        .bind(quote.id)
        .bind(quote.shipper_id)
        .bind(&quote.origin_address)
        .bind(quote.origin_lat)
        .bind(quote.origin_lng)
        .bind(&quote.destination_address)
        .bind(quote.destination_lat)
        .bind(quote.destination_lng)
        .bind(quote.distance_km)
        .bind(quote.weight_kg)
        .bind(quote.volume_cbm)
        .bind(quote.vehicle_class.as_str())
        .bind(&quote.vehicle_body_type)
        .bind(&quote.surcharge_codes)
        .bind(&quote.cargo_type)
        .bind(&quote.cargo_desc)
        .bind(quote.base_price)
        .bind(quote.extra_price)
        .bind(quote.final_price)
        .bind(quote.desired_price)
        .bind(quote.allow_combine)
        .bind(quote.load_method.as_str())
        .bind(quote.unload_method.as_str())
        .bind(quote.status.as_str())
        .bind(quote.created_at)
        .bind(quote.updated_at)
        .execute(&mut *tx)
        .await?;

        Self::insert_children(&mut tx, stops, checklist).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace(
        &self,
        quote: &Quote,
        stops: &[QuoteStop],
        checklist: &[QuoteChecklistSelection],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        // El estado solo lo cambian las transiciones del match
        let updated = sqlx::query(
            r#"
            UPDATE quotes SET origin_address = $2, origin_lat = $3, origin_lng = $4,
                destination_address = $5, destination_lat = $6, destination_lng = $7,
                distance_km = $8, weight_kg = $9, volume_cbm = $10, vehicle_class = $11,
                vehicle_body_type = $12, surcharge_codes = $13, cargo_type = $14, cargo_desc = $15,
                base_price = $16, extra_price = $17, final_price = $18, desired_price = $19,
                allow_combine = $20, load_method = $21, unload_method = $22, updated_at = $23
            WHERE id = $1
            "#,
        )
        .bind(quote.id)
        .bind(&quote.origin_address)
        .bind(quote.origin_lat)
        .bind(quote.origin_lng)
        .bind(&quote.destination_address)
        .bind(quote.destination_lat)
        .bind(quote.destination_lng)
        .bind(quote.distance_km)
        .bind(quote.weight_kg)
        .bind(quote.volume_cbm)
        .bind(quote.vehicle_class.as_str())
        .bind(&quote.vehicle_body_type)
        .bind(&quote.surcharge_codes)
        .bind(&quote.cargo_type)
        .bind(&quote.cargo_desc)
        .bind(quote.base_price)
        .bind(quote.extra_price)
        .bind(quote.final_price)
        .bind(quote.desired_price)
        .bind(quote.allow_combine)
        .bind(quote.load_method.as_str())
        .bind(quote.unload_method.as_str())
        .bind(quote.updated_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(not_found_error("Quote", quote.id));
        }

        sqlx::query("DELETE FROM quote_stops WHERE quote_id = $1")
            .bind(quote.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM quote_checklist_items WHERE quote_id = $1")
            .bind(quote.id)
            .execute(&mut *tx)
            .await?;

        Self::insert_children(&mut tx, stops, checklist).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quote>> {
        let row = sqlx::query_as::<_, QuoteRow>("SELECT * FROM quotes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Quote::try_from).transpose()
    }

    async fn find_by_shipper(&self, shipper_id: Uuid) -> AppResult<Vec<Quote>> {
        let rows = sqlx::query_as::<_, QuoteRow>(
            "SELECT * FROM quotes WHERE shipper_id = $1 ORDER BY created_at DESC",
        )
        .bind(shipper_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Quote::try_from).collect()
    }

    async fn find_stops(&self, quote_id: Uuid) -> AppResult<Vec<QuoteStop>> {
        let rows = sqlx::query_as::<_, StopRow>(
            "SELECT * FROM quote_stops WHERE quote_id = $1 ORDER BY seq ASC",
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(QuoteStop::from).collect())
    }

    async fn find_checklist(&self, quote_id: Uuid) -> AppResult<Vec<QuoteChecklistSelection>> {
        let rows = sqlx::query_as::<_, SelectionRow>(
            "SELECT * FROM quote_checklist_items WHERE quote_id = $1 ORDER BY created_at ASC",
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(QuoteChecklistSelection::from).collect())
    }

    async fn delete_if_unmatched(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Bloquea el presupuesto frente a creaciones de match concurrentes
        sqlx::query("SELECT id FROM quotes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let (active,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM matches WHERE quote_id = $1 AND status <> 'CANCELLED')",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if active {
            return Ok(false);
        }

        // Hijos, matches cancelados, pagos y ofertas caen por ON DELETE CASCADE
        sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}
