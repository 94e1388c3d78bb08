//! Utilidades de validación
//!
//! Validadores personalizados para los DTOs (`#[validate(custom = ...)]`).

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::pricing::surcharge::max_multiplier;
use crate::pricing::{LoadHandlingMethod, VehicleClass};

lazy_static! {
    /// 000-00-00000, con o sin guiones
    static ref BUSINESS_NUMBER: Regex = Regex::new(r"^\d{3}-?\d{2}-?\d{5}$").expect("valid regex");
    static ref PHONE: Regex = Regex::new(r"^0\d{1,2}-?\d{3,4}-?\d{4}$").expect("valid regex");
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Número de registro mercantil de 10 dígitos
pub fn validate_business_number(value: &str) -> Result<(), ValidationError> {
    if !BUSINESS_NUMBER.is_match(value.trim()) {
        let mut error = ValidationError::new("business_number");
        error.add_param("format".into(), &"000-00-00000".to_string());
        return Err(error);
    }
    Ok(())
}

/// Fecha de apertura YYYYMMDD
pub fn validate_opening_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d")
        .map(|_| ())
        .map_err(|_| {
            let mut error = ValidationError::new("opening_date");
            error.add_param("format".into(), &"YYYYMMDD".to_string());
            error
        })
}

/// Teléfono coreano, con o sin guiones
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if !PHONE.is_match(value.trim()) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

pub fn validate_vehicle_class(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<VehicleClass>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("vehicle_class"))
}

pub fn validate_load_method(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<LoadHandlingMethod>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("load_method"))
}

/// Factor de recargo en (0, 10]
pub fn validate_multiplier(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO || *value > max_multiplier() {
        let mut error = ValidationError::new("multiplier");
        error.add_param("max".into(), &max_multiplier().to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de coordenadas GPS
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&lat) {
        let mut error = ValidationError::new("latitude");
        error.add_param("value".into(), &lat);
        return Err(error);
    }
    if !(-180.0..=180.0).contains(&lng) {
        let mut error = ValidationError::new("longitude");
        error.add_param("value".into(), &lng);
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_business_number() {
        assert!(validate_business_number("123-45-67890").is_ok());
        assert!(validate_business_number("1234567890").is_ok());
        assert!(validate_business_number("123-45-6789").is_err());
        assert!(validate_business_number("abc-de-fghij").is_err());
    }

    #[test]
    fn test_validate_opening_date() {
        assert!(validate_opening_date("20200131").is_ok());
        assert!(validate_opening_date("20200231").is_err());
        assert!(validate_opening_date("2020-01-31").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("010-1234-5678").is_ok());
        assert!(validate_phone("01012345678").is_ok());
        assert!(validate_phone("02-123-4567").is_ok());
        assert!(validate_phone("12345").is_err());
    }

    #[test]
    fn test_enum_validators() {
        assert!(validate_vehicle_class("ton_1").is_ok());
        assert!(validate_vehicle_class("TRUCK").is_err());
        assert!(validate_load_method("DRIVER").is_ok());
        assert!(validate_load_method("forklift").is_err());
    }

    #[test]
    fn test_validate_multiplier() {
        assert!(validate_multiplier(&Decimal::new(25, 1)).is_ok());
        assert!(validate_multiplier(&Decimal::from(10)).is_ok());
        assert!(validate_multiplier(&Decimal::ZERO).is_err());
        assert!(validate_multiplier(&Decimal::new(101, 1)).is_err());
        assert!(validate_multiplier(&Decimal::MAX).is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(37.5, 127.0).is_ok());
        assert!(validate_coordinates(91.0, 127.0).is_err());
        assert!(validate_coordinates(37.5, -181.0).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("a").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }
}
