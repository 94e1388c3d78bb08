//! Modelo de Match
//!
//! Vincula un presupuesto con el conductor que lo acepta.
//!
//! ```text
//! READY ──accept──▶ READY (aceptado) ──start_transit──▶ IN_TRANSIT ──complete──▶ COMPLETED
//!   │                     │                                 │
//!   └─────────────── cancel ──────────────────────────────────┴──▶ CANCELLED
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Estado del match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Ready,
    InTransit,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Ready => "READY",
            MatchStatus::InTransit => "IN_TRANSIT",
            MatchStatus::Completed => "COMPLETED",
            MatchStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "READY" => Ok(MatchStatus::Ready),
            "IN_TRANSIT" => Ok(MatchStatus::InTransit),
            "COMPLETED" => Ok(MatchStatus::Completed),
            "CANCELLED" => Ok(MatchStatus::Cancelled),
            other => Err(format!("unknown match status: {}", other)),
        }
    }
}

/// Transición no permitida
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("match already accepted")]
    AlreadyAccepted,

    #[error("match has not been accepted yet")]
    NotAccepted,

    #[error("cannot {action} when status is {from}")]
    InvalidState { action: &'static str, from: String },
}

impl From<TransitionError> for AppError {
    fn from(error: TransitionError) -> Self {
        AppError::Conflict(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Crear nuevo match sin aceptar
    pub fn new(quote_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            quote_id,
            driver_id: None,
            accepted: false,
            accepted_at: None,
            status: MatchStatus::Ready,
            created_at: now,
            updated_at: now,
        }
    }

    /// Asigna conductor y fecha de aceptación, una sola vez
    pub fn accept(&mut self, driver_id: Uuid) -> Result<(), TransitionError> {
        if self.accepted || self.driver_id.is_some() {
            return Err(TransitionError::AlreadyAccepted);
        }
        if self.status != MatchStatus::Ready {
            return Err(self.invalid("accept"));
        }
        let now = Utc::now();
        self.driver_id = Some(driver_id);
        self.accepted = true;
        self.accepted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn start_transit(&mut self) -> Result<(), TransitionError> {
        if self.status != MatchStatus::Ready {
            return Err(self.invalid("start transit"));
        }
        if !self.accepted {
            return Err(TransitionError::NotAccepted);
        }
        self.status = MatchStatus::InTransit;
        self.touch();
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), TransitionError> {
        if self.status != MatchStatus::InTransit {
            return Err(self.invalid("complete"));
        }
        self.status = MatchStatus::Completed;
        self.touch();
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(self.invalid("cancel"));
        }
        self.status = MatchStatus::Cancelled;
        self.touch();
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status != MatchStatus::Cancelled
    }

    /// Visible en el listado de cargas disponibles
    pub fn is_open_for_drivers(&self) -> bool {
        !self.accepted && self.status == MatchStatus::Ready
    }

    pub fn is_accepted_by(&self, driver_id: Uuid) -> bool {
        self.accepted && self.driver_id == Some(driver_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn invalid(&self, action: &'static str) -> TransitionError {
        TransitionError::InvalidState {
            action,
            from: self.status.to_string(),
        }
    }
}
