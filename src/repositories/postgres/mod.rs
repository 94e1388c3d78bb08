//! Repositorios PostgreSQL
//!
//! Los enums se guardan como TEXT y se convierten al leer cada fila.

mod announcement;
mod checklist_item;
mod counter_offer;
mod matching;
mod notification;
mod payment;
mod quote;
mod surcharge_option;
mod user;

pub use announcement::PgAnnouncementRepository;
pub use checklist_item::PgChecklistItemRepository;
pub use counter_offer::PgCounterOfferRepository;
pub use matching::PgMatchRepository;
pub use notification::PgNotificationRepository;
pub use payment::PgPaymentRepository;
pub use quote::PgQuoteRepository;
pub use surcharge_option::PgSurchargeOptionRepository;
pub use user::PgUserRepository;

use std::fmt::Display;
use std::str::FromStr;

use crate::utils::errors::{internal_error, AppError};

const UNIQUE_VIOLATION: &str = "23505";

/// Convierte una violación de unicidad en Conflict
pub(crate) fn conflict_on_unique(message: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |error| {
        let unique = error
            .as_database_error()
            .and_then(|db| db.code())
            .map_or(false, |code| code == UNIQUE_VIOLATION);
        if unique {
            AppError::Conflict(message.to_string())
        } else {
            AppError::Database(error)
        }
    }
}

/// Parsear una columna TEXT a su enum
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| internal_error(format!("invalid value in column {}: {}", column, e)))
}
