//! Modelo de Payment
//!
//! Un pago se crea PENDING y se completa o falla exactamente una vez.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::matching::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Card,
    Transfer,
    Prepaid,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::Transfer => "TRANSFER",
            PaymentMethod::Prepaid => "PREPAID",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CARD" => Ok(PaymentMethod::Card),
            "TRANSFER" => Ok(PaymentMethod::Transfer),
            "PREPAID" => Ok(PaymentMethod::Prepaid),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub match_id: Uuid,
    pub order_no: String,
    pub order_name: Option<String>,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub amount: i64,
    pub amount_type: Option<String>,
    pub attempt_id: Option<String>,
    pub pg_ref: Option<String>,
    pub failure_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Crear nuevo pago en estado PENDING
    pub fn new(match_id: Uuid, order_no: String, method: PaymentMethod, amount: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            match_id,
            order_no,
            order_name: None,
            method,
            status: PaymentStatus::Pending,
            amount,
            amount_type: None,
            attempt_id: None,
            pg_ref: None,
            failure_reason: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    pub fn complete(&mut self, paid_at: DateTime<Utc>, pg_ref: String) -> Result<(), TransitionError> {
        self.ensure_pending("complete payment")?;
        self.status = PaymentStatus::Completed;
        self.paid_at = Some(paid_at);
        self.pg_ref = Some(pg_ref);
        self.touch();
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        self.ensure_pending("fail payment")?;
        self.status = PaymentStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn ensure_pending(&self, action: &'static str) -> Result<(), TransitionError> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(TransitionError::InvalidState {
                action,
                from: self.status.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settles_exactly_once() {
        let mut payment = Payment::new(Uuid::new_v4(), "FRT-1".into(), PaymentMethod::Card, 50_000);
        payment.fail("amount mismatch").unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert!(payment.complete(Utc::now(), "pk".into()).is_err());
        assert!(payment.fail("again").is_err());
        assert_eq!(payment.failure_reason.as_deref(), Some("amount mismatch"));
    }
}
