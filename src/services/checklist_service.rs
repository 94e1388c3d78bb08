//! Catálogo de checklist que el remitente puede marcar en un presupuesto

use std::sync::Arc;

use crate::models::ChecklistItem;
use crate::repositories::ChecklistItemRepository;
use crate::utils::errors::AppResult;

pub struct ChecklistService {
    repository: Arc<dyn ChecklistItemRepository>,
}

impl ChecklistService {
    pub fn new(repository: Arc<dyn ChecklistItemRepository>) -> Self {
        Self { repository }
    }

    /// Elementos habilitados ordenados por sort_order
    pub async fn list_enabled(&self) -> AppResult<Vec<ChecklistItem>> {
        self.repository.find_enabled().await
    }

    /// Carga el catálogo por defecto si todavía está vacío
    pub async fn seed_defaults(&self) -> AppResult<usize> {
        if !self.repository.find_enabled().await?.is_empty() {
            return Ok(0);
        }
        let items = default_items();
        for item in &items {
            self.repository.insert(item).await?;
        }
        tracing::info!("📋 Catálogo de checklist inicializado con {} elementos", items.len());
        Ok(items.len())
    }
}

fn default_items() -> Vec<ChecklistItem> {
    vec![
        ChecklistItem::new("화물 취급", "파손주의", 1),
        ChecklistItem::new("화물 취급", "습기주의", 2),
        ChecklistItem::new("화물 취급", "세워서 적재", 3),
        ChecklistItem::new("상하차", "엘리베이터 없음", 4).with_extra_fee(10_000),
        ChecklistItem::new("상하차", "지게차 필요", 5).with_extra_input("지게차 위치"),
        ChecklistItem::new("운송", "왕복 운송", 6).with_extra_fee(30_000),
    ]
}
