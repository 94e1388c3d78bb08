use serde::Deserialize;
use validator::Validate;

use crate::models::BusinessInfo;
use crate::pricing::VehicleClass;
use crate::services::{DriverSignup, ShipperSignup};
use crate::utils::errors::AppResult;
use crate::utils::validation::{
    validate_business_number, validate_not_blank, validate_opening_date, validate_phone,
    validate_vehicle_class,
};

// Alta de remitente
#[derive(Debug, Deserialize, Validate)]
pub struct ShipperSignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 72))]
    pub password: String,
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub company_name: String,
    #[validate(custom = "validate_business_number")]
    pub business_number: String,
    #[validate(custom = "validate_not_blank")]
    pub representative_name: String,
    #[validate(custom = "validate_opening_date")]
    pub opening_date: String,
    pub address: Option<String>,
}

impl From<ShipperSignupRequest> for ShipperSignup {
    fn from(request: ShipperSignupRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
            name: request.name,
            phone: request.phone,
            business: BusinessInfo {
                company_name: request.company_name,
                business_number: request.business_number,
                representative_name: request.representative_name,
                opening_date: request.opening_date,
            },
            address: request.address,
        }
    }
}

// Alta de conductor
#[derive(Debug, Deserialize, Validate)]
pub struct DriverSignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 72))]
    pub password: String,
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(custom = "validate_vehicle_class")]
    pub vehicle_type: Option<String>,
}

impl DriverSignupRequest {
    pub fn into_signup(self) -> AppResult<DriverSignup> {
        let vehicle_class = self
            .vehicle_type
            .as_deref()
            .map(str::parse::<VehicleClass>)
            .transpose()?;
        Ok(DriverSignup {
            email: self.email,
            password: self.password,
            name: self.name,
            phone: self.phone,
            vehicle_class,
        })
    }
}

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom = "validate_not_blank")]
    pub email: String,
    #[validate(custom = "validate_not_blank")]
    pub password: String,
}
