//! Repositorios
//!
//! Un trait por agregado. Hay dos implementaciones: `memory` (tests y
//! desarrollo local) y `postgres` (sqlx). Las escrituras que cambian de
//! estado son condicionales: devuelven `false` si el registro ya no está
//! en el estado esperado.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    Announcement, ChecklistItem, CounterOffer, Match, Notification, Payment, Quote,
    QuoteChecklistSelection, QuoteStatus, QuoteStop, SurchargeOptionRecord, User,
};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Inserta el presupuesto con sus hijos en una sola transacción
    async fn insert(
        &self,
        quote: &Quote,
        stops: &[QuoteStop],
        checklist: &[QuoteChecklistSelection],
    ) -> AppResult<()>;

    /// Actualiza el presupuesto y reemplaza sus hijos
    async fn replace(
        &self,
        quote: &Quote,
        stops: &[QuoteStop],
        checklist: &[QuoteChecklistSelection],
    ) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quote>>;

    /// Más recientes primero
    async fn find_by_shipper(&self, shipper_id: Uuid) -> AppResult<Vec<Quote>>;

    /// Ordenadas por seq
    async fn find_stops(&self, quote_id: Uuid) -> AppResult<Vec<QuoteStop>>;

    async fn find_checklist(&self, quote_id: Uuid) -> AppResult<Vec<QuoteChecklistSelection>>;

    /// Borra el presupuesto con sus hijos si no hay match activo.
    /// Devuelve `false` si existe un match activo.
    async fn delete_if_unmatched(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Falla con Conflict si ya existe un match activo para el presupuesto
    async fn insert(&self, record: &Match) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Match>>;

    async fn find_active_by_quote(&self, quote_id: Uuid) -> AppResult<Option<Match>>;

    /// Sin aceptar y en READY
    async fn find_open(&self) -> AppResult<Vec<Match>>;

    /// Excluye cancelados
    async fn find_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<Match>>;

    /// Matches de los presupuestos del remitente, excluye cancelados
    async fn find_by_shipper(&self, shipper_id: Uuid) -> AppResult<Vec<Match>>;

    /// Guarda `updated` solo si el registro sigue con el estado y la
    /// aceptación de `expected`; opcionalmente cambia el estado del
    /// presupuesto en la misma transacción.
    async fn compare_and_update(
        &self,
        expected: &Match,
        updated: &Match,
        quote_status: Option<QuoteStatus>,
    ) -> AppResult<bool>;
}

#[async_trait]
pub trait CounterOfferRepository: Send + Sync {
    /// Falla con Conflict si el conductor ya tiene una oferta PENDING
    async fn insert(&self, offer: &CounterOffer) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CounterOffer>>;

    async fn exists_pending(&self, quote_id: Uuid, driver_id: Uuid) -> AppResult<bool>;

    /// Más recientes primero
    async fn find_by_quote(&self, quote_id: Uuid) -> AppResult<Vec<CounterOffer>>;

    /// Más recientes primero
    async fn find_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<CounterOffer>>;

    async fn update_if_pending(&self, offer: &CounterOffer) -> AppResult<bool>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>>;

    /// Más recientes primero
    async fn find_by_receiver(&self, receiver_id: Uuid) -> AppResult<Vec<Notification>>;

    async fn count_unread(&self, receiver_id: Uuid) -> AppResult<i64>;

    async fn mark_read(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: &Payment) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>>;

    async fn find_by_order_no(&self, order_no: &str) -> AppResult<Option<Payment>>;

    /// Más recientes primero
    async fn find_by_match(&self, match_id: Uuid) -> AppResult<Vec<Payment>>;

    /// Pagos de los matches de los presupuestos del remitente, más recientes primero
    async fn find_by_shipper(&self, shipper_id: Uuid) -> AppResult<Vec<Payment>>;

    async fn update_if_pending(&self, payment: &Payment) -> AppResult<bool>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn insert(&self, announcement: &Announcement) -> AppResult<()>;

    async fn update(&self, announcement: &Announcement) -> AppResult<()>;

    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Announcement>>;

    /// Fijados primero, luego publishedAt y createdAt descendentes
    async fn find_all(&self) -> AppResult<Vec<Announcement>>;

    /// Igual que `find_all` pero solo publicados
    async fn find_published(&self) -> AppResult<Vec<Announcement>>;
}

#[async_trait]
pub trait ChecklistItemRepository: Send + Sync {
    async fn insert(&self, item: &ChecklistItem) -> AppResult<()>;

    /// Habilitados, ordenados por sort_order
    async fn find_enabled(&self) -> AppResult<Vec<ChecklistItem>>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<ChecklistItem>>;
}

#[async_trait]
pub trait SurchargeOptionRepository: Send + Sync {
    async fn upsert(&self, record: &SurchargeOptionRecord) -> AppResult<()>;

    async fn find_by_codes(&self, codes: &[String]) -> AppResult<Vec<SurchargeOptionRecord>>;

    async fn find_all(&self) -> AppResult<Vec<SurchargeOptionRecord>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Falla con Conflict si el email ya existe
    async fn insert(&self, user: &User) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;
}

/// Conjunto de repositorios que comparten los servicios
#[derive(Clone)]
pub struct Repositories {
    pub quotes: Arc<dyn QuoteRepository>,
    pub matches: Arc<dyn MatchRepository>,
    pub counter_offers: Arc<dyn CounterOfferRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub announcements: Arc<dyn AnnouncementRepository>,
    pub checklist_items: Arc<dyn ChecklistItemRepository>,
    pub surcharge_options: Arc<dyn SurchargeOptionRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Todos los repositorios sobre un único almacén en memoria
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            quotes: store.clone(),
            matches: store.clone(),
            counter_offers: store.clone(),
            notifications: store.clone(),
            payments: store.clone(),
            announcements: store.clone(),
            checklist_items: store.clone(),
            surcharge_options: store.clone(),
            users: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            quotes: Arc::new(postgres::PgQuoteRepository::new(pool.clone())),
            matches: Arc::new(postgres::PgMatchRepository::new(pool.clone())),
            counter_offers: Arc::new(postgres::PgCounterOfferRepository::new(pool.clone())),
            notifications: Arc::new(postgres::PgNotificationRepository::new(pool.clone())),
            payments: Arc::new(postgres::PgPaymentRepository::new(pool.clone())),
            announcements: Arc::new(postgres::PgAnnouncementRepository::new(pool.clone())),
            checklist_items: Arc::new(postgres::PgChecklistItemRepository::new(pool.clone())),
            surcharge_options: Arc::new(postgres::PgSurchargeOptionRepository::new(pool.clone())),
            users: Arc::new(postgres::PgUserRepository::new(pool)),
        }
    }
}
