//! Notificaciones
//!
//! Se crean como efecto secundario de las transiciones de match y de
//! contraofertas. Solo cambian al marcarse como leídas.

use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Notification, NotificationType, Principal};
use crate::repositories::NotificationRepository;
use crate::utils::errors::{forbidden_error, not_found_error, AppResult};

pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    /// Registra una notificación. Un fallo se registra en el log y no
    /// deshace la transición que la originó.
    pub async fn notify(
        &self,
        receiver_id: Uuid,
        match_id: Option<Uuid>,
        notification_type: NotificationType,
        message: &str,
    ) {
        let notification = Notification::new(receiver_id, match_id, notification_type, message);
        if let Err(e) = self.repository.insert(&notification).await {
            tracing::warn!(
                "⚠️ No se pudo guardar la notificación {} para {}: {}",
                notification_type,
                receiver_id,
                e
            );
        }
    }

    /// Mis notificaciones, más recientes primero
    pub async fn list_mine(&self, principal: &Principal) -> AppResult<Vec<Notification>> {
        self.repository.find_by_receiver(principal.user_id).await
    }

    pub async fn unread_count(&self, principal: &Principal) -> AppResult<i64> {
        self.repository.count_unread(principal.user_id).await
    }

    /// Solo el destinatario puede marcarla
    pub async fn mark_read(&self, principal: &Principal, notification_id: Uuid) -> AppResult<()> {
        let notification = self
            .repository
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| not_found_error("Notification", notification_id))?;

        if notification.receiver_id != principal.user_id {
            return Err(forbidden_error("mark notification as read", "not the receiver"));
        }
        if !notification.is_read {
            self.repository.mark_read(notification_id).await?;
        }
        Ok(())
    }
}
