use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{conflict_on_unique, parse_column};
use crate::models::{BusinessInfo, User};
use crate::pricing::VehicleClass;
use crate::repositories::UserRepository;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    phone: Option<String>,
    role: String,
    company_name: Option<String>,
    business_number: Option<String>,
    representative_name: Option<String>,
    opening_date: Option<String>,
    vehicle_class: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let business = match (row.company_name, row.business_number) {
            (Some(company_name), Some(business_number)) => Some(BusinessInfo {
                company_name,
                business_number,
                representative_name: row.representative_name.unwrap_or_default(),
                opening_date: row.opening_date.unwrap_or_default(),
            }),
            _ => None,
        };
        let vehicle_class = row
            .vehicle_class
            .as_deref()
            .map(|value| parse_column::<VehicleClass>("vehicle_class", value))
            .transpose()?;

        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            phone: row.phone,
            role: parse_column("role", &row.role)?,
            business,
            vehicle_class,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: &User) -> AppResult<()> {
        let business = user.business.as_ref();
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, phone, role, company_name,
                business_number, representative_name, opening_date, vehicle_class,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(business.map(|b| b.company_name.as_str()))
        .bind(business.map(|b| b.business_number.as_str()))
        .bind(business.map(|b| b.representative_name.as_str()))
        .bind(business.map(|b| b.opening_date.as_str()))
        .bind(user.vehicle_class.map(|class| class.as_str()))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(conflict_on_unique("email already registered"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
