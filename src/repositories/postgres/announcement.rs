use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::Announcement;
use crate::repositories::AnnouncementRepository;
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Debug, FromRow)]
struct AnnouncementRow {
    id: Uuid,
    admin_id: Uuid,
    title: String,
    content: String,
    is_pinned: bool,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AnnouncementRow> for Announcement {
    fn from(row: AnnouncementRow) -> Self {
        Announcement {
            id: row.id,
            admin_id: row.admin_id,
            title: row.title,
            content: row.content,
            is_pinned: row.is_pinned,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgAnnouncementRepository {
    pool: PgPool,
}

impl PgAnnouncementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnnouncementRepository for PgAnnouncementRepository {
    async fn insert(&self, announcement: &Announcement) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO announcements (id, admin_id, title, content, is_pinned, published_at,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(announcement.id)
        .bind(announcement.admin_id)
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.is_pinned)
        .bind(announcement.published_at)
        .bind(announcement.created_at)
        .bind(announcement.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, announcement: &Announcement) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE announcements
            SET title = $2, content = $3, is_pinned = $4, published_at = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(announcement.id)
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.is_pinned)
        .bind(announcement.published_at)
        .bind(announcement.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Announcement", announcement.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>("SELECT * FROM announcements WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Announcement::from))
    }

    async fn find_all(&self) -> AppResult<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT * FROM announcements
            ORDER BY is_pinned DESC, published_at DESC NULLS LAST, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Announcement::from).collect())
    }

    async fn find_published(&self) -> AppResult<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT * FROM announcements
            WHERE published_at IS NOT NULL
            ORDER BY is_pinned DESC, published_at DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Announcement::from).collect())
    }
}
