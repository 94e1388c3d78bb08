//! Modelo de Notification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    MatchCreated,
    MatchAccepted,
    MatchCancelled,
    CounterOfferCreated,
    CounterOfferAccepted,
    CounterOfferRejected,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::MatchCreated => "MATCH_CREATED",
            NotificationType::MatchAccepted => "MATCH_ACCEPTED",
            NotificationType::MatchCancelled => "MATCH_CANCELLED",
            NotificationType::CounterOfferCreated => "COUNTER_OFFER_CREATED",
            NotificationType::CounterOfferAccepted => "COUNTER_OFFER_ACCEPTED",
            NotificationType::CounterOfferRejected => "COUNTER_OFFER_REJECTED",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "MATCH_CREATED" => Ok(NotificationType::MatchCreated),
            "MATCH_ACCEPTED" => Ok(NotificationType::MatchAccepted),
            "MATCH_CANCELLED" => Ok(NotificationType::MatchCancelled),
            "COUNTER_OFFER_CREATED" => Ok(NotificationType::CounterOfferCreated),
            "COUNTER_OFFER_ACCEPTED" => Ok(NotificationType::CounterOfferAccepted),
            "COUNTER_OFFER_REJECTED" => Ok(NotificationType::CounterOfferRejected),
            other => Err(format!("unknown notification type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub receiver_id: Uuid,
    pub match_id: Option<Uuid>,
    pub notification_type: NotificationType,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        receiver_id: Uuid,
        match_id: Option<Uuid>,
        notification_type: NotificationType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            receiver_id,
            match_id,
            notification_type,
            message: message.into(),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
