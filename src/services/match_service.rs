//! Servicio de matches
//!
//! Un match une un presupuesto OPEN con un conductor. Las transiciones se
//! serializan por presupuesto con `KeyedLocks` y se guardan con una
//! comparación de estado en el repositorio, de modo que dos aceptaciones
//! concurrentes nunca tienen éxito a la vez.

use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    Match, NotificationType, Principal, Quote, QuoteStatus, TransitionError, UserRole,
};
use crate::repositories::{MatchRepository, QuoteRepository};
use crate::services::authorization_service::{ensure_quote_owner, is_match_party, require_role};
use crate::services::keyed_locks::KeyedLocks;
use crate::services::notification_service::NotificationService;
use crate::utils::errors::{conflict_error, forbidden_error, not_found_error, AppResult};

pub struct MatchService {
    quotes: Arc<dyn QuoteRepository>,
    matches: Arc<dyn MatchRepository>,
    notifications: Arc<NotificationService>,
    locks: Arc<KeyedLocks>,
}

impl MatchService {
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        matches: Arc<dyn MatchRepository>,
        notifications: Arc<NotificationService>,
        locks: Arc<KeyedLocks>,
    ) -> Self {
        Self {
            quotes,
            matches,
            notifications,
            locks,
        }
    }

    /// Crear match READY para un presupuesto OPEN del remitente
    pub async fn create(&self, principal: &Principal, quote_id: Uuid) -> AppResult<Match> {
        require_role(principal, UserRole::Shipper, "create match")?;
        let _guard = self.locks.lock(quote_id).await;

        let quote = self.find_quote(quote_id).await?;
        ensure_quote_owner(principal, &quote, "create match")?;
        if !quote.is_open() {
            return Err(conflict_error(format!("quote is {} and cannot be matched", quote.status)));
        }
        if self.matches.find_active_by_quote(quote_id).await?.is_some() {
            return Err(conflict_error("an active match already exists for this quote"));
        }

        let record = Match::new(quote_id);
        self.matches.insert(&record).await?;
        tracing::info!("🤝 Match {} creado para el presupuesto {}", record.id, quote_id);

        self.notifications
            .notify(
                quote.shipper_id,
                Some(record.id),
                NotificationType::MatchCreated,
                "견적에 대한 매칭이 생성되었습니다.",
            )
            .await;

        Ok(record)
    }

    /// Matches disponibles para los conductores
    pub async fn open_matches(&self, principal: &Principal) -> AppResult<Vec<Match>> {
        require_role(principal, UserRole::Driver, "list open matches")?;
        self.matches.find_open().await
    }

    /// Aceptación del conductor; el presupuesto pasa a MATCHED
    pub async fn accept(&self, principal: &Principal, match_id: Uuid) -> AppResult<Match> {
        require_role(principal, UserRole::Driver, "accept match")?;
        let quote_id = self.find_match(match_id).await?.quote_id;
        let _guard = self.locks.lock(quote_id).await;

        let current = self.find_match(match_id).await?;
        let quote = self.find_quote(current.quote_id).await?;

        let mut updated = current.clone();
        updated.accept(principal.user_id)?;
        if !self
            .matches
            .compare_and_update(&current, &updated, Some(QuoteStatus::Matched))
            .await?
        {
            return Err(conflict_error("match already accepted"));
        }

        tracing::info!("✅ Match {} aceptado por el conductor {}", match_id, principal.user_id);
        self.notifications
            .notify(
                quote.shipper_id,
                Some(match_id),
                NotificationType::MatchAccepted,
                "기사님이 매칭을 수락했습니다.",
            )
            .await;

        Ok(updated)
    }

    /// Cancelación por el remitente dueño o por el conductor aceptado.
    /// El presupuesto vuelve a OPEN.
    pub async fn cancel(&self, principal: &Principal, match_id: Uuid) -> AppResult<Match> {
        let quote_id = self.find_match(match_id).await?.quote_id;
        let _guard = self.locks.lock(quote_id).await;

        let current = self.find_match(match_id).await?;
        let quote = self.find_quote(current.quote_id).await?;

        match principal.role {
            UserRole::Shipper => ensure_quote_owner(principal, &quote, "cancel match")?,
            UserRole::Driver if current.is_accepted_by(principal.user_id) => {}
            UserRole::Driver => {
                return Err(forbidden_error("cancel match", "driver has not accepted this match"))
            }
            UserRole::Admin => return Err(forbidden_error("cancel match", "role not allowed")),
        }

        let mut updated = current.clone();
        updated.cancel()?;
        if !self
            .matches
            .compare_and_update(&current, &updated, Some(QuoteStatus::Open))
            .await?
        {
            return Err(conflict_error("match was modified concurrently"));
        }

        tracing::info!(
            "🚫 Match {} cancelado por {} ({}); presupuesto {} reabierto",
            match_id,
            principal.user_id,
            principal.role,
            quote.id
        );

        match principal.role {
            UserRole::Shipper => {
                if let Some(driver_id) = current.driver_id {
                    self.notifications
                        .notify(
                            driver_id,
                            Some(match_id),
                            NotificationType::MatchCancelled,
                            "화주가 매칭을 취소했습니다.",
                        )
                        .await;
                }
            }
            _ => {
                self.notifications
                    .notify(
                        quote.shipper_id,
                        Some(match_id),
                        NotificationType::MatchCancelled,
                        "기사님이 매칭을 취소했습니다.",
                    )
                    .await;
            }
        }

        Ok(updated)
    }

    /// READY + aceptado → IN_TRANSIT
    pub async fn start_transit(&self, principal: &Principal, match_id: Uuid) -> AppResult<Match> {
        self.driver_transition(principal, match_id, "start transit", Match::start_transit)
            .await
    }

    /// IN_TRANSIT → COMPLETED
    pub async fn complete(&self, principal: &Principal, match_id: Uuid) -> AppResult<Match> {
        self.driver_transition(principal, match_id, "complete match", Match::complete)
            .await
    }

    pub async fn get(&self, principal: &Principal, match_id: Uuid) -> AppResult<Match> {
        let record = self.find_match(match_id).await?;
        let quote = self.find_quote(record.quote_id).await?;
        if !is_match_party(principal, &record, quote.shipper_id) {
            return Err(forbidden_error("read match", "caller is not a party of this match"));
        }
        Ok(record)
    }

    /// Match activo de un presupuesto del remitente
    pub async fn by_quote(&self, principal: &Principal, quote_id: Uuid) -> AppResult<Match> {
        let quote = self.find_quote(quote_id).await?;
        ensure_quote_owner(principal, &quote, "read match")?;
        self.matches
            .find_active_by_quote(quote_id)
            .await?
            .ok_or_else(|| not_found_error("Match for quote", quote_id))
    }

    pub async fn driver_matches(&self, principal: &Principal) -> AppResult<Vec<Match>> {
        require_role(principal, UserRole::Driver, "list driver matches")?;
        self.matches.find_by_driver(principal.user_id).await
    }

    pub async fn shipper_matches(&self, principal: &Principal) -> AppResult<Vec<Match>> {
        require_role(principal, UserRole::Shipper, "list shipper matches")?;
        self.matches.find_by_shipper(principal.user_id).await
    }

    async fn driver_transition(
        &self,
        principal: &Principal,
        match_id: Uuid,
        operation: &str,
        transition: fn(&mut Match) -> Result<(), TransitionError>,
    ) -> AppResult<Match> {
        require_role(principal, UserRole::Driver, operation)?;
        let quote_id = self.find_match(match_id).await?.quote_id;
        let _guard = self.locks.lock(quote_id).await;

        let current = self.find_match(match_id).await?;
        if !current.is_accepted_by(principal.user_id) {
            return Err(forbidden_error(operation, "driver has not accepted this match"));
        }

        let mut updated = current.clone();
        transition(&mut updated)?;
        if !self.matches.compare_and_update(&current, &updated, None).await? {
            return Err(conflict_error("match was modified concurrently"));
        }

        tracing::info!("🚚 Match {} → {}", match_id, updated.status);
        Ok(updated)
    }

    async fn find_match(&self, match_id: Uuid) -> AppResult<Match> {
        self.matches
            .find_by_id(match_id)
            .await?
            .ok_or_else(|| not_found_error("Match", match_id))
    }

    async fn find_quote(&self, quote_id: Uuid) -> AppResult<Quote> {
        self.quotes
            .find_by_id(quote_id)
            .await?
            .ok_or_else(|| not_found_error("Quote", quote_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;
    use crate::repositories::memory::MemoryStore;
    use crate::services::fixtures::insert_open_quote;
    use crate::utils::errors::AppError;

    fn service(store: &Arc<MemoryStore>) -> MatchService {
        MatchService::new(
            store.clone(),
            store.clone(),
            Arc::new(NotificationService::new(store.clone())),
            Arc::new(KeyedLocks::new()),
        )
    }

    #[tokio::test]
    async fn test_match_lifecycle() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let shipper = Principal::shipper(Uuid::new_v4());
        let driver = Principal::driver(Uuid::new_v4());
        let quote = insert_open_quote(store.as_ref(), shipper.user_id).await;

        let created = service.create(&shipper, quote.id).await.unwrap();
        assert_eq!(created.status, MatchStatus::Ready);
        assert_eq!(service.open_matches(&driver).await.unwrap().len(), 1);

        let accepted = service.accept(&driver, created.id).await.unwrap();
        assert_eq!(accepted.driver_id, Some(driver.user_id));
        let stored = QuoteRepository::find_by_id(store.as_ref(), quote.id).await.unwrap().unwrap();
        assert_eq!(stored.status, QuoteStatus::Matched);
        assert!(service.open_matches(&driver).await.unwrap().is_empty());

        let in_transit = service.start_transit(&driver, created.id).await.unwrap();
        assert_eq!(in_transit.status, MatchStatus::InTransit);
        let completed = service.complete(&driver, created.id).await.unwrap();
        assert_eq!(completed.status, MatchStatus::Completed);

        let again = service.cancel(&driver, created.id).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_second_accept_is_conflict() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let shipper = Principal::shipper(Uuid::new_v4());
        let quote = insert_open_quote(store.as_ref(), shipper.user_id).await;
        let created = service.create(&shipper, quote.id).await.unwrap();

        service
            .accept(&Principal::driver(Uuid::new_v4()), created.id)
            .await
            .unwrap();
        let second = service
            .accept(&Principal::driver(Uuid::new_v4()), created.id)
            .await;
        match second {
            Err(AppError::Conflict(message)) => assert_eq!(message, "match already accepted"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shipper_cancel_reopens_quote() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let shipper = Principal::shipper(Uuid::new_v4());
        let driver = Principal::driver(Uuid::new_v4());
        let quote = insert_open_quote(store.as_ref(), shipper.user_id).await;

        let created = service.create(&shipper, quote.id).await.unwrap();
        service.accept(&driver, created.id).await.unwrap();
        let cancelled = service.cancel(&shipper, created.id).await.unwrap();
        assert_eq!(cancelled.status, MatchStatus::Cancelled);

        let stored = QuoteRepository::find_by_id(store.as_ref(), quote.id).await.unwrap().unwrap();
        assert!(stored.is_open());
        assert!(service.create(&shipper, quote.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_driver_cannot_cancel_unaccepted_match() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let shipper = Principal::shipper(Uuid::new_v4());
        let quote = insert_open_quote(store.as_ref(), shipper.user_id).await;
        let created = service.create(&shipper, quote.id).await.unwrap();

        let result = service.cancel(&Principal::driver(Uuid::new_v4()), created.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_requires_open_quote_without_active_match() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let shipper = Principal::shipper(Uuid::new_v4());
        let quote = insert_open_quote(store.as_ref(), shipper.user_id).await;

        service.create(&shipper, quote.id).await.unwrap();
        let duplicate = service.create(&shipper, quote.id).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        let other = Principal::shipper(Uuid::new_v4());
        let foreign = service.create(&other, quote.id).await;
        assert!(matches!(foreign, Err(AppError::Forbidden(_))));

        let missing = service.create(&shipper, Uuid::new_v4()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
