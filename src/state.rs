//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::clients::{AdvisoryGenerator, BusinessRegistry, PaymentProcessor};
use crate::config::environment::EnvironmentConfig;
use crate::pricing::{PricingCalculator, RateTable};
use crate::repositories::Repositories;
use crate::services::{
    AccountService, AnnouncementService, ChecklistService, CounterOfferService, JwtService,
    KeyedLocks, MatchService, NotificationService, PaymentService, QuoteService, SurchargeService,
};

/// Colaboradores externos inyectados al construir el estado
#[derive(Clone)]
pub struct Collaborators {
    pub payment_processor: Arc<dyn PaymentProcessor>,
    pub business_registry: Arc<dyn BusinessRegistry>,
    pub advisory: Arc<dyn AdvisoryGenerator>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub jwt: Arc<JwtService>,
    pub accounts: Arc<AccountService>,
    pub quotes: Arc<QuoteService>,
    pub matches: Arc<MatchService>,
    pub counter_offers: Arc<CounterOfferService>,
    pub notifications: Arc<NotificationService>,
    pub payments: Arc<PaymentService>,
    pub announcements: Arc<AnnouncementService>,
    pub checklist: Arc<ChecklistService>,
    pub surcharges: Arc<SurchargeService>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        repositories: Repositories,
        rate_table: Arc<RateTable>,
        collaborators: Collaborators,
    ) -> Self {
        let jwt = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_expiration));
        let calculator = Arc::new(PricingCalculator::new(rate_table));
        // Compartidos: crear match, aceptar, cancelar y editar un presupuesto
        // se serializan sobre el mismo id
        let quote_locks = Arc::new(KeyedLocks::new());

        let notifications = Arc::new(NotificationService::new(repositories.notifications.clone()));
        let surcharges = Arc::new(SurchargeService::new(repositories.surcharge_options.clone()));

        let quotes = Arc::new(QuoteService::new(
            repositories.quotes.clone(),
            repositories.checklist_items.clone(),
            calculator,
            surcharges.clone(),
            collaborators.advisory,
            quote_locks.clone(),
        ));
        let matches = Arc::new(MatchService::new(
            repositories.quotes.clone(),
            repositories.matches.clone(),
            notifications.clone(),
            quote_locks.clone(),
        ));
        let counter_offers = Arc::new(CounterOfferService::new(
            repositories.quotes.clone(),
            repositories.counter_offers.clone(),
            notifications.clone(),
            quote_locks,
        ));
        let payments = Arc::new(PaymentService::new(
            repositories.quotes.clone(),
            repositories.matches.clone(),
            repositories.payments.clone(),
            collaborators.payment_processor,
        ));
        let accounts = Arc::new(AccountService::new(
            repositories.users.clone(),
            collaborators.business_registry,
            jwt.clone(),
            config.bcrypt_cost,
        ));

        Self {
            config: Arc::new(config),
            jwt,
            accounts,
            quotes,
            matches,
            counter_offers,
            notifications,
            payments,
            announcements: Arc::new(AnnouncementService::new(repositories.announcements.clone())),
            checklist: Arc::new(ChecklistService::new(repositories.checklist_items.clone())),
            surcharges,
        }
    }
}
