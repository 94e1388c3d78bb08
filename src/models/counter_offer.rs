//! Modelo de CounterOffer
//!
//! Propuesta de precio alternativa de un conductor sobre un presupuesto.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::matching::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounterOfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl CounterOfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterOfferStatus::Pending => "PENDING",
            CounterOfferStatus::Accepted => "ACCEPTED",
            CounterOfferStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for CounterOfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CounterOfferStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PENDING" => Ok(CounterOfferStatus::Pending),
            "ACCEPTED" => Ok(CounterOfferStatus::Accepted),
            "REJECTED" => Ok(CounterOfferStatus::Rejected),
            other => Err(format!("unknown counter offer status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterOffer {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub driver_id: Uuid,
    pub proposed_price: i64,
    pub message: Option<String>,
    pub status: CounterOfferStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl CounterOffer {
    pub fn new(quote_id: Uuid, driver_id: Uuid, proposed_price: i64, message: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            quote_id,
            driver_id,
            proposed_price,
            message,
            status: CounterOfferStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == CounterOfferStatus::Pending
    }

    /// Pasa a ACCEPTED o REJECTED y sella respondedAt
    pub fn respond(&mut self, accept: bool) -> Result<(), TransitionError> {
        if !self.is_pending() {
            return Err(TransitionError::InvalidState {
                action: if accept { "accept offer" } else { "reject offer" },
                from: self.status.to_string(),
            });
        }
        self.status = if accept {
            CounterOfferStatus::Accepted
        } else {
            CounterOfferStatus::Rejected
        };
        self.responded_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respond_once() {
        let mut offer = CounterOffer::new(Uuid::new_v4(), Uuid::new_v4(), 120_000, None);
        offer.respond(false).unwrap();
        assert_eq!(offer.status, CounterOfferStatus::Rejected);
        let responded_at = offer.responded_at;
        assert!(responded_at.is_some());

        assert!(offer.respond(true).is_err());
        assert_eq!(offer.status, CounterOfferStatus::Rejected);
        assert_eq!(offer.responded_at, responded_at);
    }
}
