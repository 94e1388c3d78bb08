use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::ChecklistItem;
use crate::repositories::ChecklistItemRepository;
use crate::utils::errors::AppResult;

#[derive(Debug, FromRow)]
struct ChecklistItemRow {
    id: Uuid,
    category: String,
    name: String,
    icon: Option<String>,
    has_extra_fee: bool,
    base_extra_fee: i64,
    requires_extra_input: bool,
    extra_input_label: Option<String>,
    sort_order: i32,
    enabled: bool,
    created_at: DateTime<Utc>,
}

impl From<ChecklistItemRow> for ChecklistItem {
    fn from(row: ChecklistItemRow) -> Self {
        ChecklistItem {
            id: row.id,
            category: row.category,
            name: row.name,
            icon: row.icon,
            has_extra_fee: row.has_extra_fee,
            base_extra_fee: row.base_extra_fee,
            requires_extra_input: row.requires_extra_input,
            extra_input_label: row.extra_input_label,
            sort_order: row.sort_order,
            enabled: row.enabled,
            created_at: row.created_at,
        }
    }
}

pub struct PgChecklistItemRepository {
    pool: PgPool,
}

impl PgChecklistItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChecklistItemRepository for PgChecklistItemRepository {
    async fn insert(&self, item: &ChecklistItem) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO checklist_items (id, category, name, icon, has_extra_fee, base_extra_fee,
                requires_extra_input, extra_input_label, sort_order, enabled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(item.id)
        .bind(&item.category)
        .bind(&item.name)
        .bind(&item.icon)
        .bind(item.has_extra_fee)
        .bind(item.base_extra_fee)
        .bind(item.requires_extra_input)
        .bind(&item.extra_input_label)
        .bind(item.sort_order)
        .bind(item.enabled)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_enabled(&self) -> AppResult<Vec<ChecklistItem>> {
        let rows = sqlx::query_as::<_, ChecklistItemRow>(
            "SELECT * FROM checklist_items WHERE enabled = TRUE ORDER BY sort_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ChecklistItem::from).collect())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<ChecklistItem>> {
        let rows = sqlx::query_as::<_, ChecklistItemRow>(
            "SELECT * FROM checklist_items WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ChecklistItem::from).collect())
    }
}
