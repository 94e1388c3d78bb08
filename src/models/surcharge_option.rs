//! Modelo de SurchargeOption
//!
//! Registro dinámico de recargo. Un registro habilitado sustituye a la
//! regla estática con el mismo código; uno deshabilitado la elimina.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::pricing::{PricingError, SurchargeKind, SurchargeOptionType, SurchargeRule, VehicleClass};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargeOptionRecord {
    pub id: Uuid,
    pub code: String,
    pub option_type: SurchargeOptionType,
    pub min_add_won: Option<i64>,
    pub max_add_won: Option<i64>,
    pub min_multiplier: Option<Decimal>,
    pub max_multiplier: Option<Decimal>,
    pub fixed_add_won: Option<i64>,
    pub vehicle_rates: HashMap<VehicleClass, i64>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SurchargeOptionRecord {
    pub fn new(code: impl Into<String>, option_type: SurchargeOptionType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            option_type,
            min_add_won: None,
            max_add_won: None,
            min_multiplier: None,
            max_multiplier: None,
            fixed_add_won: None,
            vehicle_rates: HashMap::new(),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<&SurchargeOptionRecord> for SurchargeRule {
    type Error = PricingError;

    fn try_from(record: &SurchargeOptionRecord) -> Result<Self, Self::Error> {
        let missing = |field: &str| PricingError::InvalidSurcharge {
            code: record.code.clone(),
            reason: format!("{} is required for {}", field, record.option_type),
        };

        let kind = match record.option_type {
            SurchargeOptionType::Add => SurchargeKind::Add {
                min: Decimal::from(record.min_add_won.ok_or_else(|| missing("min_add_won"))?),
                max: Decimal::from(record.max_add_won.ok_or_else(|| missing("max_add_won"))?),
            },
            SurchargeOptionType::Mult => SurchargeKind::Mult {
                min: record.min_multiplier.ok_or_else(|| missing("min_multiplier"))?,
                max: record.max_multiplier.ok_or_else(|| missing("max_multiplier"))?,
            },
            SurchargeOptionType::Fixed => SurchargeKind::Fixed {
                amount: Decimal::from(record.fixed_add_won.ok_or_else(|| missing("fixed_add_won"))?),
            },
            SurchargeOptionType::FixedByVehicle => SurchargeKind::FixedByVehicle {
                amounts: record
                    .vehicle_rates
                    .iter()
                    .map(|(class, amount)| (*class, Decimal::from(*amount)))
                    .collect(),
            },
        };

        SurchargeRule::new(record.code.clone(), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_to_rule() {
        let mut record = SurchargeOptionRecord::new("COLD_CHAIN", SurchargeOptionType::Add);
        record.min_add_won = Some(60_000);
        record.max_add_won = Some(90_000);

        let rule = SurchargeRule::try_from(&record).unwrap();
        assert_eq!(
            rule.kind,
            SurchargeKind::Add {
                min: Decimal::from(60_000),
                max: Decimal::from(90_000)
            }
        );
    }

    #[test]
    fn test_incomplete_record_is_rejected() {
        let record = SurchargeOptionRecord::new("BROKEN", SurchargeOptionType::Mult);
        assert!(matches!(
            SurchargeRule::try_from(&record),
            Err(PricingError::InvalidSurcharge { .. })
        ));
    }

    #[test]
    fn test_per_vehicle_record() {
        let mut record = SurchargeOptionRecord::new("LIFT", SurchargeOptionType::FixedByVehicle);
        record.vehicle_rates.insert(VehicleClass::Ton1, 12_000);
        let rule = SurchargeRule::try_from(&record).unwrap();
        assert_eq!(rule.option_type(), SurchargeOptionType::FixedByVehicle);
    }
}
