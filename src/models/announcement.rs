//! Modelo de Announcement

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    pub fn new(admin_id: Uuid, title: String, content: String, is_pinned: bool, publish: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            admin_id,
            title,
            content,
            is_pinned,
            published_at: publish.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Solo sella publishedAt la primera vez
    pub fn publish(&mut self) {
        if self.published_at.is_none() {
            self.published_at = Some(Utc::now());
        }
        self.touch();
    }

    pub fn unpublish(&mut self) {
        self.published_at = None;
        self.touch();
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Orden de listado: fijados primero, luego publishedAt y createdAt descendentes
pub fn display_order(a: &Announcement, b: &Announcement) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.published_at.cmp(&a.published_at))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_publish_stamps_once() {
        let mut announcement = Announcement::new(Uuid::new_v4(), "t".into(), "c".into(), false, true);
        let first = announcement.published_at;
        announcement.publish();
        assert_eq!(announcement.published_at, first);

        announcement.unpublish();
        assert!(!announcement.is_published());
    }

    #[test]
    fn test_display_order() {
        let admin = Uuid::new_v4();
        let now = Utc::now();
        let mut pinned = Announcement::new(admin, "pinned".into(), "c".into(), true, true);
        pinned.published_at = Some(now - Duration::days(10));
        let mut recent = Announcement::new(admin, "recent".into(), "c".into(), false, true);
        recent.published_at = Some(now);
        let mut older = Announcement::new(admin, "older".into(), "c".into(), false, true);
        older.published_at = Some(now - Duration::days(1));

        let mut list = vec![older.clone(), recent.clone(), pinned.clone()];
        list.sort_by(display_order);
        let titles: Vec<&str> = list.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["pinned", "recent", "older"]);
    }
}
