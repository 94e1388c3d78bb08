//! Services module
//!
//! Este módulo contiene la lógica de negocio. Cada operación recibe el
//! `Principal` que la invoca; ningún servicio lee identidad ambiental.

pub mod account_service;
pub mod announcement_service;
pub mod authorization_service;
pub mod checklist_service;
pub mod counter_offer_service;
pub mod jwt_service;
pub mod keyed_locks;
pub mod match_service;
pub mod notification_service;
pub mod payment_service;
pub mod quote_service;
pub mod surcharge_service;

#[cfg(test)]
pub(crate) mod fixtures;

pub use account_service::{AccountService, AccountView, AuthSession, DriverSignup, ShipperSignup};
pub use announcement_service::{AnnouncementChanges, AnnouncementService};
pub use checklist_service::ChecklistService;
pub use counter_offer_service::CounterOfferService;
pub use jwt_service::JwtService;
pub use keyed_locks::KeyedLocks;
pub use match_service::MatchService;
pub use notification_service::NotificationService;
pub use payment_service::{NewPayment, PaymentService, PreparedPayment};
pub use quote_service::{QuoteService, QuoteValidation};
pub use surcharge_service::SurchargeService;
