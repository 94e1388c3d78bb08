//! Reglas de recargo
//!
//! Un único tipo de regla con cuatro variantes. Las reglas se construyen
//! desde el catálogo estático de este módulo o desde registros dinámicos
//! guardados en base de datos (ver `models::surcharge_option`).

use lazy_static::lazy_static;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::vehicle_class::VehicleClass;
use super::PricingError;

/// Importe máximo de un recargo aditivo o fijo (100 millones de won)
pub const MAX_SURCHARGE_WON: i64 = 100_000_000;

/// Factor multiplicativo máximo
pub fn max_multiplier() -> Decimal {
    Decimal::from(10)
}

/// Tipo de opción tal como se persiste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurchargeOptionType {
    Add,
    Mult,
    Fixed,
    FixedByVehicle,
}

impl SurchargeOptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurchargeOptionType::Add => "ADD",
            SurchargeOptionType::Mult => "MULT",
            SurchargeOptionType::Fixed => "FIXED",
            SurchargeOptionType::FixedByVehicle => "FIXED_BY_VEHICLE",
        }
    }
}

impl fmt::Display for SurchargeOptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurchargeOptionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADD" => Ok(SurchargeOptionType::Add),
            "MULT" => Ok(SurchargeOptionType::Mult),
            "FIXED" => Ok(SurchargeOptionType::Fixed),
            "FIXED_BY_VEHICLE" => Ok(SurchargeOptionType::FixedByVehicle),
            other => Err(format!("unknown surcharge option type: {}", other)),
        }
    }
}

/// Variante de la regla con sus parámetros
#[derive(Debug, Clone, PartialEq)]
pub enum SurchargeKind {
    /// Importe aditivo con cotas independientes
    Add { min: Decimal, max: Decimal },
    /// Factor multiplicativo con cotas independientes
    Mult { min: Decimal, max: Decimal },
    /// Importe fijo aplicado a ambas cotas
    Fixed { amount: Decimal },
    /// Importe fijo por clase de vehículo
    FixedByVehicle { amounts: HashMap<VehicleClass, Decimal> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurchargeRule {
    pub code: String,
    pub kind: SurchargeKind,
}

impl SurchargeRule {
    pub fn add(code: impl Into<String>, min: i64, max: i64) -> Result<Self, PricingError> {
        Self::new(
            code,
            SurchargeKind::Add {
                min: Decimal::from(min),
                max: Decimal::from(max),
            },
        )
    }

    pub fn mult(code: impl Into<String>, min: Decimal, max: Decimal) -> Result<Self, PricingError> {
        Self::new(code, SurchargeKind::Mult { min, max })
    }

    pub fn fixed(code: impl Into<String>, amount: i64) -> Result<Self, PricingError> {
        Self::new(
            code,
            SurchargeKind::Fixed {
                amount: Decimal::from(amount),
            },
        )
    }

    pub fn fixed_by_vehicle(
        code: impl Into<String>,
        amounts: &[(VehicleClass, i64)],
    ) -> Result<Self, PricingError> {
        let amounts = amounts
            .iter()
            .map(|(class, amount)| (*class, Decimal::from(*amount)))
            .collect();
        Self::new(code, SurchargeKind::FixedByVehicle { amounts })
    }

    /// Construir validando las cotas
    pub fn new(code: impl Into<String>, kind: SurchargeKind) -> Result<Self, PricingError> {
        let code = code.into();
        let invalid = |reason: String| PricingError::InvalidSurcharge {
            code: code.clone(),
            reason,
        };
        let cap = Decimal::from(MAX_SURCHARGE_WON);
        let out_of_bounds = |amount: &Decimal| amount.is_sign_negative() || *amount > cap;

        match &kind {
            SurchargeKind::Add { min, max } => {
                if out_of_bounds(min) || out_of_bounds(max) || max < min {
                    return Err(invalid(format!(
                        "additive bounds must satisfy 0 <= min <= max <= {}",
                        MAX_SURCHARGE_WON
                    )));
                }
            }
            SurchargeKind::Mult { min, max } => {
                if *min <= Decimal::ZERO || max < min || *max > max_multiplier() {
                    return Err(invalid(format!(
                        "multiplier bounds must satisfy 0 < min <= max <= {}",
                        max_multiplier()
                    )));
                }
            }
            SurchargeKind::Fixed { amount } => {
                if out_of_bounds(amount) {
                    return Err(invalid(format!(
                        "fixed amount must be within 0..={}",
                        MAX_SURCHARGE_WON
                    )));
                }
            }
            SurchargeKind::FixedByVehicle { amounts } => {
                if amounts.values().any(out_of_bounds) {
                    return Err(invalid(format!(
                        "per-vehicle amounts must be within 0..={}",
                        MAX_SURCHARGE_WON
                    )));
                }
            }
        }

        Ok(Self { code, kind })
    }

    pub fn option_type(&self) -> SurchargeOptionType {
        match self.kind {
            SurchargeKind::Add { .. } => SurchargeOptionType::Add,
            SurchargeKind::Mult { .. } => SurchargeOptionType::Mult,
            SurchargeKind::Fixed { .. } => SurchargeOptionType::Fixed,
            SurchargeKind::FixedByVehicle { .. } => SurchargeOptionType::FixedByVehicle,
        }
    }

    pub fn is_multiplier(&self) -> bool {
        matches!(self.kind, SurchargeKind::Mult { .. })
    }
}

lazy_static! {
    static ref BUILT_IN_RULES: HashMap<String, SurchargeRule> = build_catalog();
}

fn build_catalog() -> HashMap<String, SurchargeRule> {
    use VehicleClass::*;

    let heavy = [Ton11, Ton14, Ton15, Ton18, Ton25];

    let mut lift_wingbody: Vec<(VehicleClass, i64)> = vec![
        (Ton1, 40_000),
        (Ton1_4, 50_000),
        (Ton2_5, 80_000),
        (Ton3_5, 90_000),
        (Ton5, 100_000),
        (Ton5Axle, 120_000),
        (Ton8, 120_000),
    ];
    lift_wingbody.extend(heavy.iter().map(|class| (*class, 150_000)));

    let mut lift: Vec<(VehicleClass, i64)> = vec![
        (Ton1, 10_000),
        (Ton1_4, 15_000),
        (Ton2_5, 50_000),
        (Ton3_5, 60_000),
        (Ton5, 80_000),
        (Ton5Axle, 100_000),
        (Ton8, 100_000),
    ];
    lift.extend(heavy.iter().map(|class| (*class, 130_000)));

    let rules = [
        SurchargeRule::fixed_by_vehicle("LIFT_WINGBODY", &lift_wingbody),
        SurchargeRule::fixed_by_vehicle("LIFT_HORO", &[(Ton1, 15_000), (Ton1_4, 25_000)]),
        SurchargeRule::fixed_by_vehicle("HORO_JABARA", &[(Ton1, 5_000), (Ton1_4, 10_000)]),
        SurchargeRule::fixed_by_vehicle("LIFT", &lift),
        SurchargeRule::fixed("WINGBODY_TOP", 30_000),
        SurchargeRule::add("COLD_CHAIN", 50_000, 100_000),
        SurchargeRule::add("HANGER", 50_000, 100_000),
        SurchargeRule::mult("ANTI_VIBRATION_WINGBODY", Decimal::new(20, 1), Decimal::new(25, 1)),
    ];

    rules
        .into_iter()
        .flatten()
        .map(|rule| (rule.code.clone(), rule))
        .collect()
}

/// Códigos del catálogo estático
pub const BUILT_IN_CODES: [&str; 8] = [
    "LIFT_WINGBODY",
    "LIFT_HORO",
    "HORO_JABARA",
    "LIFT",
    "WINGBODY_TOP",
    "COLD_CHAIN",
    "HANGER",
    "ANTI_VIBRATION_WINGBODY",
];

/// Regla estática para un código
pub fn built_in_rule(code: &str) -> Option<SurchargeRule> {
    BUILT_IN_RULES.get(code).cloned()
}

/// Código de recargo implícito en el tipo de carrocería
pub fn code_for_body_type(body_type: &str) -> Option<&'static str> {
    match body_type.trim().to_ascii_uppercase().as_str() {
        "LIFT" => Some("LIFT"),
        "LIFT_WINGBODY" => Some("LIFT_WINGBODY"),
        "TOP" => Some("WINGBODY_TOP"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_complete() {
        for code in BUILT_IN_CODES {
            assert!(built_in_rule(code).is_some(), "missing {}", code);
        }
        assert!(built_in_rule("NOPE").is_none());
    }

    #[test]
    fn test_catalog_values() {
        let lift = built_in_rule("LIFT").unwrap();
        match lift.kind {
            SurchargeKind::FixedByVehicle { amounts } => {
                assert_eq!(amounts.get(&VehicleClass::Ton2_5), Some(&Decimal::from(50_000)));
                assert_eq!(amounts.get(&VehicleClass::Ton25), Some(&Decimal::from(130_000)));
                assert!(amounts.get(&VehicleClass::Damas).is_none());
            }
            other => panic!("unexpected kind {:?}", other),
        }

        let anti_vibration = built_in_rule("ANTI_VIBRATION_WINGBODY").unwrap();
        assert!(anti_vibration.is_multiplier());
        assert_eq!(
            built_in_rule("WINGBODY_TOP").unwrap().option_type(),
            SurchargeOptionType::Fixed
        );
    }

    #[test]
    fn test_body_type_mapping() {
        assert_eq!(code_for_body_type("LIFT"), Some("LIFT"));
        assert_eq!(code_for_body_type("lift_wingbody"), Some("LIFT_WINGBODY"));
        assert_eq!(code_for_body_type("TOP"), Some("WINGBODY_TOP"));
        assert_eq!(code_for_body_type("WINGBODY"), None);
        assert_eq!(code_for_body_type("CARGO"), None);
        assert_eq!(code_for_body_type(""), None);
    }

    #[test]
    fn test_invalid_bounds_are_rejected() {
        assert!(SurchargeRule::add("X", 10, 5).is_err());
        assert!(SurchargeRule::fixed("X", -1).is_err());
        assert!(SurchargeRule::mult("X", Decimal::ZERO, Decimal::ONE).is_err());
        assert!(SurchargeRule::mult("X", Decimal::new(25, 1), Decimal::new(20, 1)).is_err());
    }

    #[test]
    fn test_bounds_are_capped() {
        assert!(SurchargeRule::mult("X", Decimal::ONE, max_multiplier()).is_ok());
        assert!(SurchargeRule::mult("X", Decimal::ONE, Decimal::new(101, 1)).is_err());
        assert!(SurchargeRule::mult("X", Decimal::ONE, Decimal::MAX).is_err());

        assert!(SurchargeRule::add("X", 0, MAX_SURCHARGE_WON).is_ok());
        assert!(SurchargeRule::add("X", 0, MAX_SURCHARGE_WON + 1).is_err());
        assert!(SurchargeRule::add("X", i64::MAX, i64::MAX).is_err());
        assert!(SurchargeRule::fixed("X", MAX_SURCHARGE_WON + 1).is_err());
        assert!(SurchargeRule::fixed_by_vehicle("X", &[(VehicleClass::Ton1, i64::MAX)]).is_err());
    }

    #[test]
    fn test_option_type_parsing() {
        assert_eq!(
            "fixed_by_vehicle".parse::<SurchargeOptionType>().unwrap(),
            SurchargeOptionType::FixedByVehicle
        );
        assert!("PERCENT".parse::<SurchargeOptionType>().is_err());
    }
}
