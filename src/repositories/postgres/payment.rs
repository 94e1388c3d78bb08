use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{conflict_on_unique, parse_column};
use crate::models::Payment;
use crate::repositories::PaymentRepository;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, FromRow)]
struct PaymentRow {
    id: Uuid,
    match_id: Uuid,
    order_no: String,
    order_name: Option<String>,
    method: String,
    status: String,
    amount: i64,
    amount_type: Option<String>,
    attempt_id: Option<String>,
    pg_ref: Option<String>,
    failure_reason: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: row.id,
            match_id: row.match_id,
            order_no: row.order_no,
            order_name: row.order_name,
            method: parse_column("method", &row.method)?,
            status: parse_column("status", &row.status)?,
            amount: row.amount,
            amount_type: row.amount_type,
            attempt_id: row.attempt_id,
            pg_ref: row.pg_ref,
            failure_reason: row.failure_reason,
            paid_at: row.paid_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_payments(rows: Vec<PaymentRow>) -> AppResult<Vec<Payment>> {
    rows.into_iter().map(Payment::try_from).collect()
}

pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn insert(&self, payment: &Payment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, match_id, order_no, order_name, method, status, amount,
                amount_type, attempt_id, pg_ref, failure_reason, paid_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(payment.id)
        .bind(payment.match_id)
        .bind(&payment.order_no)
        .bind(&payment.order_name)
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(payment.amount)
        .bind(&payment.amount_type)
        .bind(&payment.attempt_id)
        .bind(&payment.pg_ref)
        .bind(&payment.failure_reason)
        .bind(payment.paid_at)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(conflict_on_unique("order number already exists"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Payment::try_from).transpose()
    }

    async fn find_by_order_no(&self, order_no: &str) -> AppResult<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>("SELECT * FROM payments WHERE order_no = $1")
            .bind(order_no)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Payment::try_from).transpose()
    }

    async fn find_by_match(&self, match_id: Uuid) -> AppResult<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            "SELECT * FROM payments WHERE match_id = $1 ORDER BY created_at DESC",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;
        into_payments(rows)
    }

    async fn find_by_shipper(&self, shipper_id: Uuid) -> AppResult<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT p.* FROM payments p
            JOIN matches m ON m.id = p.match_id
            JOIN quotes q ON q.id = m.quote_id
            WHERE q.shipper_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(shipper_id)
        .fetch_all(&self.pool)
        .await?;
        into_payments(rows)
    }

    async fn update_if_pending(&self, payment: &Payment) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET order_no = $2, order_name = $3, method = $4, status = $5, amount = $6,
                amount_type = $7, attempt_id = $8, pg_ref = $9, failure_reason = $10,
                paid_at = $11, updated_at = $12
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(payment.id)
        .bind(&payment.order_no)
        .bind(&payment.order_name)
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(payment.amount)
        .bind(&payment.amount_type)
        .bind(&payment.attempt_id)
        .bind(&payment.pg_ref)
        .bind(&payment.failure_reason)
        .bind(payment.paid_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(conflict_on_unique("order number already exists"))?;
        Ok(result.rows_affected() == 1)
    }
}
