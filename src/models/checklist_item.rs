//! Modelo de ChecklistItem
//!
//! Catálogo de requisitos adicionales que el remitente puede marcar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub category: String,
    pub name: String,
    pub icon: Option<String>,
    pub has_extra_fee: bool,
    pub base_extra_fee: i64,
    pub requires_extra_input: bool,
    pub extra_input_label: Option<String>,
    pub sort_order: i32,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl ChecklistItem {
    pub fn new(category: impl Into<String>, name: impl Into<String>, sort_order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            name: name.into(),
            icon: None,
            has_extra_fee: false,
            base_extra_fee: 0,
            requires_extra_input: false,
            extra_input_label: None,
            sort_order,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_extra_fee(mut self, fee: i64) -> Self {
        self.has_extra_fee = fee > 0;
        self.base_extra_fee = fee;
        self
    }

    pub fn with_extra_input(mut self, label: impl Into<String>) -> Self {
        self.requires_extra_input = true;
        self.extra_input_label = Some(label.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
