//! Modelos del sistema
//!
//! Agregados del dominio. Las marcas de tiempo se asignan en los
//! constructores y en `touch()`, nunca de forma implícita.

pub mod announcement;
pub mod auth;
pub mod checklist_item;
pub mod counter_offer;
pub mod matching;
pub mod notification;
pub mod payment;
pub mod quote;
pub mod surcharge_option;
pub mod user;

pub use announcement::Announcement;
pub use auth::{Principal, UserRole};
pub use checklist_item::ChecklistItem;
pub use counter_offer::{CounterOffer, CounterOfferStatus};
pub use matching::{Match, MatchStatus, TransitionError};
pub use notification::{Notification, NotificationType};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use quote::{
    ChecklistSelectionDraft, Quote, QuoteChecklistSelection, QuoteDetail, QuoteDraft, QuotePrices,
    QuoteStatus, QuoteStop, StopDraft,
};
pub use surcharge_option::SurchargeOptionRecord;
pub use user::{BusinessInfo, User};
