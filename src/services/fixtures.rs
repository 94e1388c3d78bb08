//! Datos de prueba compartidos por los tests de servicios

use uuid::Uuid;

use crate::models::{Quote, QuoteDraft, QuotePrices};
use crate::pricing::{LoadHandlingMethod, VehicleClass};
use crate::repositories::QuoteRepository;

pub fn sample_draft() -> QuoteDraft {
    QuoteDraft {
        origin_address: "서울 강남구 테헤란로 1".into(),
        origin_lat: Some(37.5),
        origin_lng: Some(127.03),
        destination_address: "경기 수원시 팔달구 2".into(),
        destination_lat: None,
        destination_lng: None,
        distance_km: 10,
        weight_kg: Some(500),
        volume_cbm: None,
        vehicle_class: VehicleClass::Ton1,
        vehicle_body_type: None,
        surcharge_codes: vec![],
        cargo_type: Some("가구".into()),
        cargo_desc: None,
        desired_price: None,
        allow_combine: false,
        load_method: LoadHandlingMethod::Shipper,
        unload_method: LoadHandlingMethod::Shipper,
        stops: vec![],
        checklist: vec![],
    }
}

/// Presupuesto OPEN guardado directamente en el repositorio
pub async fn insert_open_quote(repository: &dyn QuoteRepository, shipper_id: Uuid) -> Quote {
    let prices = QuotePrices {
        base_price: 50_000,
        extra_price: 0,
        final_price: 55_000,
        desired_price: 60_000,
    };
    let quote = Quote::new(shipper_id, &sample_draft(), prices);
    repository.insert(&quote, &[], &[]).await.unwrap();
    quote
}
