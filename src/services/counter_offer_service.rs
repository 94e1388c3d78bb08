//! Contraofertas de precio de los conductores
//!
//! Aceptar o rechazar una contraoferta solo cambia su propio estado; ni el
//! presupuesto ni el match se modifican.

use std::sync::Arc;
use uuid::Uuid;

use crate::models::{CounterOffer, NotificationType, Principal, Quote, UserRole};
use crate::repositories::{CounterOfferRepository, QuoteRepository};
use crate::services::authorization_service::{ensure_quote_owner, require_role};
use crate::services::keyed_locks::KeyedLocks;
use crate::services::notification_service::NotificationService;
use crate::utils::errors::{conflict_error, invalid_input_error, not_found_error, AppResult};

pub struct CounterOfferService {
    quotes: Arc<dyn QuoteRepository>,
    offers: Arc<dyn CounterOfferRepository>,
    notifications: Arc<NotificationService>,
    locks: Arc<KeyedLocks>,
}

impl CounterOfferService {
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        offers: Arc<dyn CounterOfferRepository>,
        notifications: Arc<NotificationService>,
        locks: Arc<KeyedLocks>,
    ) -> Self {
        Self {
            quotes,
            offers,
            notifications,
            locks,
        }
    }

    /// Una sola contraoferta PENDING por conductor y presupuesto
    pub async fn create(
        &self,
        principal: &Principal,
        quote_id: Uuid,
        proposed_price: i64,
        message: Option<String>,
    ) -> AppResult<CounterOffer> {
        require_role(principal, UserRole::Driver, "create counter offer")?;
        if proposed_price <= 0 {
            return Err(invalid_input_error("proposed price must be positive"));
        }
        let _guard = self.locks.lock(quote_id).await;

        let quote = self.find_quote(quote_id).await?;
        if !quote.is_open() {
            return Err(conflict_error(format!("quote is {} and does not accept offers", quote.status)));
        }
        if self.offers.exists_pending(quote_id, principal.user_id).await? {
            return Err(conflict_error("a pending counter offer already exists for this quote"));
        }

        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        let offer = CounterOffer::new(quote_id, principal.user_id, proposed_price, message);
        self.offers.insert(&offer).await?;
        tracing::info!(
            "💬 Contraoferta {} de {} KRW para el presupuesto {}",
            offer.id,
            proposed_price,
            quote_id
        );

        self.notifications
            .notify(
                quote.shipper_id,
                None,
                NotificationType::CounterOfferCreated,
                "기사님이 새로운 금액을 제안했습니다.",
            )
            .await;

        Ok(offer)
    }

    pub async fn accept(&self, principal: &Principal, offer_id: Uuid) -> AppResult<CounterOffer> {
        self.respond(principal, offer_id, true).await
    }

    pub async fn reject(&self, principal: &Principal, offer_id: Uuid) -> AppResult<CounterOffer> {
        self.respond(principal, offer_id, false).await
    }

    /// Contraofertas de un presupuesto propio, más recientes primero
    pub async fn for_quote(&self, principal: &Principal, quote_id: Uuid) -> AppResult<Vec<CounterOffer>> {
        let quote = self.find_quote(quote_id).await?;
        ensure_quote_owner(principal, &quote, "list counter offers")?;
        self.offers.find_by_quote(quote_id).await
    }

    pub async fn mine(&self, principal: &Principal) -> AppResult<Vec<CounterOffer>> {
        require_role(principal, UserRole::Driver, "list counter offers")?;
        self.offers.find_by_driver(principal.user_id).await
    }

    async fn respond(&self, principal: &Principal, offer_id: Uuid, accept: bool) -> AppResult<CounterOffer> {
        let operation = if accept { "accept counter offer" } else { "reject counter offer" };
        let mut offer = self
            .offers
            .find_by_id(offer_id)
            .await?
            .ok_or_else(|| not_found_error("CounterOffer", offer_id))?;
        let quote = self.find_quote(offer.quote_id).await?;
        ensure_quote_owner(principal, &quote, operation)?;

        offer.respond(accept)?;
        if !self.offers.update_if_pending(&offer).await? {
            return Err(conflict_error("counter offer was already answered"));
        }
        tracing::info!("💬 Contraoferta {} → {}", offer.id, offer.status);

        let (notification_type, message) = if accept {
            (NotificationType::CounterOfferAccepted, "화주가 제안을 수락했습니다.")
        } else {
            (NotificationType::CounterOfferRejected, "화주가 제안을 거절했습니다.")
        };
        self.notifications
            .notify(offer.driver_id, None, notification_type, message)
            .await;

        Ok(offer)
    }

    async fn find_quote(&self, quote_id: Uuid) -> AppResult<Quote> {
        self.quotes
            .find_by_id(quote_id)
            .await?
            .ok_or_else(|| not_found_error("Quote", quote_id))
    }
}
