use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

use crate::models::SurchargeOptionRecord;
use crate::pricing::{SurchargeOptionType, VehicleClass};
use crate::utils::validation::{validate_multiplier, validate_not_blank};

// Alta o modificación de un recargo dinámico
#[derive(Debug, Deserialize, Validate)]
pub struct SurchargeOptionRequest {
    #[validate(length(max = 50), custom = "validate_not_blank")]
    pub code: String,
    pub option_type: SurchargeOptionType,
    #[validate(range(min = 0, max = 100000000))]
    pub min_add_won: Option<i64>,
    #[validate(range(min = 0, max = 100000000))]
    pub max_add_won: Option<i64>,
    #[validate(custom = "validate_multiplier")]
    pub min_multiplier: Option<Decimal>,
    #[validate(custom = "validate_multiplier")]
    pub max_multiplier: Option<Decimal>,
    #[validate(range(min = 0, max = 100000000))]
    pub fixed_add_won: Option<i64>,
    #[serde(default)]
    pub vehicle_rates: HashMap<VehicleClass, i64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl From<SurchargeOptionRequest> for SurchargeOptionRecord {
    fn from(request: SurchargeOptionRequest) -> Self {
        let mut record = SurchargeOptionRecord::new(request.code, request.option_type);
        record.min_add_won = request.min_add_won;
        record.max_add_won = request.max_add_won;
        record.min_multiplier = request.min_multiplier;
        record.max_multiplier = request.max_multiplier;
        record.fixed_add_won = request.fixed_add_won;
        record.vehicle_rates = request.vehicle_rates;
        record.enabled = request.enabled;
        record
    }
}
