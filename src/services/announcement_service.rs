//! Avisos de la plataforma
//!
//! Los administradores los gestionan; cualquiera lee los publicados.

use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Announcement, Principal, UserRole};
use crate::repositories::AnnouncementRepository;
use crate::services::authorization_service::require_role;
use crate::utils::errors::{invalid_input_error, not_found_error, AppResult};

/// Cambios parciales de un aviso
#[derive(Debug, Clone, Default)]
pub struct AnnouncementChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
    pub published: Option<bool>,
}

pub struct AnnouncementService {
    repository: Arc<dyn AnnouncementRepository>,
}

impl AnnouncementService {
    pub fn new(repository: Arc<dyn AnnouncementRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        title: &str,
        content: &str,
        is_pinned: bool,
        publish: bool,
    ) -> AppResult<Announcement> {
        require_role(principal, UserRole::Admin, "create announcement")?;
        let announcement = Announcement::new(
            principal.user_id,
            required_text("title", title)?,
            required_text("content", content)?,
            is_pinned,
            publish,
        );
        self.repository.insert(&announcement).await?;
        tracing::info!("📢 Aviso {} creado por {}", announcement.id, principal.user_id);
        Ok(announcement)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: AnnouncementChanges,
    ) -> AppResult<Announcement> {
        require_role(principal, UserRole::Admin, "update announcement")?;
        let mut announcement = self.find(id).await?;

        if let Some(title) = changes.title {
            announcement.title = required_text("title", &title)?;
        }
        if let Some(content) = changes.content {
            announcement.content = required_text("content", &content)?;
        }
        if let Some(is_pinned) = changes.is_pinned {
            announcement.is_pinned = is_pinned;
        }
        match changes.published {
            Some(true) => announcement.publish(),
            Some(false) => announcement.unpublish(),
            None => announcement.touch(),
        }

        self.repository.update(&announcement).await?;
        Ok(announcement)
    }

    pub async fn delete(&self, principal: &Principal, id: Uuid) -> AppResult<()> {
        require_role(principal, UserRole::Admin, "delete announcement")?;
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Announcement", id));
        }
        tracing::info!("🗑️ Aviso {} borrado", id);
        Ok(())
    }

    pub async fn get(&self, principal: &Principal, id: Uuid) -> AppResult<Announcement> {
        require_role(principal, UserRole::Admin, "read announcement")?;
        self.find(id).await
    }

    pub async fn list_all(&self, principal: &Principal) -> AppResult<Vec<Announcement>> {
        require_role(principal, UserRole::Admin, "list announcements")?;
        self.repository.find_all().await
    }

    /// Avisos publicados: fijados primero, luego los más recientes
    pub async fn list_published(&self) -> AppResult<Vec<Announcement>> {
        self.repository.find_published().await
    }

    async fn find(&self, id: Uuid) -> AppResult<Announcement> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Announcement", id))
    }
}

fn required_text(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid_input_error(format!("{} must not be blank", field)));
    }
    Ok(value.to_string())
}
