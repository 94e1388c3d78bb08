//! Motor de precios
//!
//! Tabla de tarifas por tramo de distancia y clase de vehículo, reglas de
//! recargo y la calculadora que compone el precio final.

pub mod calculator;
pub mod distance_range;
pub mod money;
pub mod rate_table;
pub mod surcharge;
pub mod vehicle_class;

pub use calculator::{PricingCalculator, PricingInput, PricingResult};
pub use distance_range::{resolve_key, DistanceRangeKey, MAX_SUPPORTED_KM};
pub use rate_table::{RateTable, RateTableError};
pub use surcharge::{SurchargeKind, SurchargeOptionType, SurchargeRule};
pub use vehicle_class::{LoadHandlingMethod, VehicleClass};

use thiserror::Error;

/// Errores del motor de precios
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("unsupported distance: {0} km")]
    UnsupportedDistance(i32),

    #[error("unsupported vehicle class: {0}")]
    UnsupportedVehicleClass(VehicleClass),

    #[error("unknown vehicle class: {0}")]
    UnknownVehicleClass(String),

    #[error("unknown load handling method: {0}")]
    UnknownLoadMethod(String),

    #[error("unknown surcharge option: {0}")]
    UnknownSurcharge(String),

    #[error("multiple multiplier options are not supported")]
    ConflictingMultipliers,

    #[error("option {code} is not available for vehicle type {vehicle}")]
    OptionUnavailableForVehicle { code: String, vehicle: VehicleClass },

    #[error("invalid surcharge definition {code}: {reason}")]
    InvalidSurcharge { code: String, reason: String },

    #[error("price amount is out of range")]
    AmountOutOfRange,
}
