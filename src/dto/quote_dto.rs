//! DTOs de presupuestos
//!
//! Los nombres de vehículo y de método de carga llegan como texto y se
//! convierten a los enums del motor de precios en `into_draft`.

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{ChecklistSelectionDraft, QuoteDraft, StopDraft};
use crate::pricing::{LoadHandlingMethod, VehicleClass};
use crate::utils::errors::AppResult;
use crate::utils::validation::{
    validate_coordinates, validate_load_method, validate_not_blank, validate_vehicle_class,
};

// Parámetros de envío (crear, actualizar, validar y estimar)
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_quote_coordinates"))]
pub struct QuoteRequest {
    #[validate(custom = "validate_not_blank")]
    pub origin_address: String,
    pub origin_lat: Option<f64>,
    pub origin_lng: Option<f64>,
    #[validate(custom = "validate_not_blank")]
    pub destination_address: String,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    #[validate(range(min = 1, max = 500))]
    pub distance_km: i32,
    #[validate(range(min = 0))]
    pub weight_kg: Option<i32>,
    #[validate(range(min = 0))]
    pub volume_cbm: Option<i32>,
    #[validate(custom = "validate_vehicle_class")]
    pub vehicle_type: String,
    pub vehicle_body_type: Option<String>,
    #[serde(default)]
    pub surcharge_options: Vec<String>,
    #[validate(length(max = 100))]
    pub cargo_type: Option<String>,
    #[validate(length(max = 1000))]
    pub cargo_desc: Option<String>,
    #[validate(range(min = 0))]
    pub desired_price: Option<i64>,
    #[serde(default)]
    pub allow_combine: bool,
    #[validate(custom = "validate_load_method")]
    pub load_method: Option<String>,
    #[validate(custom = "validate_load_method")]
    pub unload_method: Option<String>,
    #[serde(default)]
    #[validate]
    pub stops: Vec<StopRequest>,
    #[serde(default)]
    #[validate]
    pub checklist_items: Vec<ChecklistSelectionRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StopRequest {
    pub seq: Option<i32>,
    #[validate(length(max = 255))]
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub dept_name: Option<String>,
    pub manager_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChecklistSelectionRequest {
    pub checklist_item_id: Uuid,
    #[validate(length(max = 255))]
    pub extra_input: Option<String>,
    #[validate(range(min = 0))]
    pub extra_fee: Option<i64>,
}

fn validate_quote_coordinates(request: &QuoteRequest) -> Result<(), ValidationError> {
    let pairs = [
        (request.origin_lat, request.origin_lng),
        (request.destination_lat, request.destination_lng),
    ];
    for (lat, lng) in pairs {
        if let (Some(lat), Some(lng)) = (lat, lng) {
            validate_coordinates(lat, lng)?;
        }
    }
    Ok(())
}

fn load_method(value: Option<&str>) -> AppResult<LoadHandlingMethod> {
    Ok(value
        .map(str::parse::<LoadHandlingMethod>)
        .transpose()?
        .unwrap_or(LoadHandlingMethod::Shipper))
}

impl QuoteRequest {
    pub fn into_draft(self) -> AppResult<QuoteDraft> {
        Ok(QuoteDraft {
            vehicle_class: self.vehicle_type.parse::<VehicleClass>()?,
            load_method: load_method(self.load_method.as_deref())?,
            unload_method: load_method(self.unload_method.as_deref())?,
            origin_address: self.origin_address,
            origin_lat: self.origin_lat,
            origin_lng: self.origin_lng,
            destination_address: self.destination_address,
            destination_lat: self.destination_lat,
            destination_lng: self.destination_lng,
            distance_km: self.distance_km,
            weight_kg: self.weight_kg,
            volume_cbm: self.volume_cbm,
            vehicle_body_type: self
                .vehicle_body_type
                .map(|body| body.trim().to_string())
                .filter(|body| !body.is_empty()),
            surcharge_codes: self.surcharge_options,
            cargo_type: self.cargo_type,
            cargo_desc: self.cargo_desc,
            desired_price: self.desired_price,
            allow_combine: self.allow_combine,
            stops: self
                .stops
                .into_iter()
                .map(|stop| StopDraft {
                    seq: stop.seq,
                    address: stop.address,
                    lat: stop.lat,
                    lng: stop.lng,
                    contact_name: stop.contact_name,
                    contact_phone: stop.contact_phone,
                    dept_name: stop.dept_name,
                    manager_name: stop.manager_name,
                })
                .collect(),
            checklist: self
                .checklist_items
                .into_iter()
                .map(|item| ChecklistSelectionDraft {
                    checklist_item_id: item.checklist_item_id,
                    extra_input: item.extra_input,
                    extra_fee: item.extra_fee,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> QuoteRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_into_draft_defaults() {
        let draft = request(json!({
            "origin_address": "서울",
            "destination_address": "부산",
            "distance_km": 120,
            "vehicle_type": "ton_1",
            "vehicle_body_type": "  ",
            "load_method": "driver"
        }))
        .into_draft()
        .unwrap();

        assert_eq!(draft.vehicle_class, VehicleClass::Ton1);
        assert_eq!(draft.load_method, LoadHandlingMethod::Driver);
        assert_eq!(draft.unload_method, LoadHandlingMethod::Shipper);
        assert!(draft.vehicle_body_type.is_none());
        assert!(draft.stops.is_empty());
    }

    #[test]
    fn test_validation_rejects_bad_fields() {
        let bad = request(json!({
            "origin_address": " ",
            "destination_address": "부산",
            "distance_km": 0,
            "vehicle_type": "TRUCK",
            "origin_lat": 120.0,
            "origin_lng": 127.0
        }));
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("origin_address"));
        assert!(fields.contains_key("distance_km"));
        assert!(fields.contains_key("vehicle_type"));
        assert!(fields.contains_key("__all__"));
    }
}
