//! Modelo de Quote
//!
//! Solicitud de transporte de un remitente con su instantánea de precios,
//! paradas intermedias y selecciones de checklist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::pricing::money::to_won;
use crate::pricing::{LoadHandlingMethod, PricingError, PricingResult, VehicleClass};

/// Estado del presupuesto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    Open,
    Matched,
    Cancelled,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Open => "OPEN",
            QuoteStatus::Matched => "MATCHED",
            QuoteStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "OPEN" => Ok(QuoteStatus::Open),
            "MATCHED" => Ok(QuoteStatus::Matched),
            "CANCELLED" => Ok(QuoteStatus::Cancelled),
            other => Err(format!("unknown quote status: {}", other)),
        }
    }
}

/// Parada intermedia propuesta
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopDraft {
    pub seq: Option<i32>,
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub dept_name: Option<String>,
    pub manager_name: Option<String>,
}

/// Selección de un elemento de checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistSelectionDraft {
    pub checklist_item_id: Uuid,
    pub extra_input: Option<String>,
    pub extra_fee: Option<i64>,
}

/// Parámetros de envío tal como los envía el remitente
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDraft {
    pub origin_address: String,
    pub origin_lat: Option<f64>,
    pub origin_lng: Option<f64>,
    pub destination_address: String,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub distance_km: i32,
    pub weight_kg: Option<i32>,
    pub volume_cbm: Option<i32>,
    pub vehicle_class: VehicleClass,
    pub vehicle_body_type: Option<String>,
    pub surcharge_codes: Vec<String>,
    pub cargo_type: Option<String>,
    pub cargo_desc: Option<String>,
    pub desired_price: Option<i64>,
    pub allow_combine: bool,
    pub load_method: LoadHandlingMethod,
    pub unload_method: LoadHandlingMethod,
    pub stops: Vec<StopDraft>,
    pub checklist: Vec<ChecklistSelectionDraft>,
}

/// Precios persistidos junto al presupuesto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePrices {
    pub base_price: i64,
    pub extra_price: i64,
    pub final_price: i64,
    pub desired_price: i64,
}

impl QuotePrices {
    /// Instantánea a partir de una estimación
    pub fn from_pricing(
        pricing: &PricingResult,
        desired_price: Option<i64>,
    ) -> Result<Self, PricingError> {
        let base_price = to_won(pricing.rate_won)?;
        let weighted = to_won(pricing.weighted_won)?;
        let final_price = to_won(pricing.final_charge_after_discount_won)?;
        Ok(Self {
            base_price,
            extra_price: (weighted - base_price).max(0),
            final_price,
            desired_price: desired_price.unwrap_or(final_price),
        })
    }
}

/// Quote principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub shipper_id: Uuid,
    pub origin_address: String,
    pub origin_lat: Option<f64>,
    pub origin_lng: Option<f64>,
    pub destination_address: String,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub distance_km: i32,
    pub weight_kg: Option<i32>,
    pub volume_cbm: Option<i32>,
    pub vehicle_class: VehicleClass,
    pub vehicle_body_type: Option<String>,
    pub surcharge_codes: Vec<String>,
    pub cargo_type: Option<String>,
    pub cargo_desc: Option<String>,
    pub base_price: i64,
    pub extra_price: i64,
    pub final_price: i64,
    pub desired_price: i64,
    pub allow_combine: bool,
    pub load_method: LoadHandlingMethod,
    pub unload_method: LoadHandlingMethod,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Crear nuevo presupuesto en estado OPEN
    pub fn new(shipper_id: Uuid, draft: &QuoteDraft, prices: QuotePrices) -> Self {
        let now = Utc::now();
        let mut quote = Self {
            id: Uuid::new_v4(),
            shipper_id,
            origin_address: String::new(),
            origin_lat: None,
            origin_lng: None,
            destination_address: String::new(),
            destination_lat: None,
            destination_lng: None,
            distance_km: 0,
            weight_kg: None,
            volume_cbm: None,
            vehicle_class: draft.vehicle_class,
            vehicle_body_type: None,
            surcharge_codes: Vec::new(),
            cargo_type: None,
            cargo_desc: None,
            base_price: 0,
            extra_price: 0,
            final_price: 0,
            desired_price: 0,
            allow_combine: false,
            load_method: draft.load_method,
            unload_method: draft.unload_method,
            status: QuoteStatus::Open,
            created_at: now,
            updated_at: now,
        };
        quote.apply(draft, prices);
        quote.updated_at = now;
        quote
    }

    /// Reemplazar los parámetros de envío y los precios
    pub fn apply(&mut self, draft: &QuoteDraft, prices: QuotePrices) {
        self.origin_address = draft.origin_address.trim().to_string();
        self.origin_lat = draft.origin_lat;
        self.origin_lng = draft.origin_lng;
        self.destination_address = draft.destination_address.trim().to_string();
        self.destination_lat = draft.destination_lat;
        self.destination_lng = draft.destination_lng;
        self.distance_km = draft.distance_km;
        self.weight_kg = draft.weight_kg;
        self.volume_cbm = draft.volume_cbm;
        self.vehicle_class = draft.vehicle_class;
        self.vehicle_body_type = draft.vehicle_body_type.clone();
        self.surcharge_codes = draft.surcharge_codes.clone();
        self.cargo_type = draft.cargo_type.clone();
        self.cargo_desc = draft.cargo_desc.clone();
        self.base_price = prices.base_price;
        self.extra_price = prices.extra_price;
        self.final_price = prices.final_price;
        self.desired_price = prices.desired_price;
        self.allow_combine = draft.allow_combine;
        self.load_method = draft.load_method;
        self.unload_method = draft.unload_method;
        self.touch();
    }

    pub fn set_status(&mut self, status: QuoteStatus) {
        self.status = status;
        self.touch();
    }

    pub fn is_open(&self) -> bool {
        self.status == QuoteStatus::Open
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Parada intermedia persistida
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteStop {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub seq: i32,
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub dept_name: Option<String>,
    pub manager_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl QuoteStop {
    /// None si la dirección está vacía
    pub fn from_draft(quote_id: Uuid, draft: &StopDraft) -> Option<Self> {
        let address = draft.address.trim();
        if address.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            quote_id,
            seq: draft.seq.unwrap_or(0),
            address: address.to_string(),
            lat: draft.lat,
            lng: draft.lng,
            contact_name: draft.contact_name.clone(),
            contact_phone: draft.contact_phone.clone(),
            dept_name: draft.dept_name.clone(),
            manager_name: draft.manager_name.clone(),
            created_at: Utc::now(),
        })
    }
}

/// Selección de checklist persistida
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteChecklistSelection {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub checklist_item_id: Uuid,
    pub extra_input: Option<String>,
    pub extra_fee: i64,
    pub created_at: DateTime<Utc>,
}

impl QuoteChecklistSelection {
    pub fn from_draft(quote_id: Uuid, draft: &ChecklistSelectionDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            quote_id,
            checklist_item_id: draft.checklist_item_id,
            extra_input: draft.extra_input.clone(),
            extra_fee: draft.extra_fee.unwrap_or(0),
            created_at: Utc::now(),
        }
    }
}

/// Presupuesto con sus hijos
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub stops: Vec<QuoteStop>,
    pub checklist: Vec<QuoteChecklistSelection>,
}
