//! Utilidades compartidas por los tests de integración
#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use freight_market::clients::{
    BusinessRegistry, BusinessValidation, DisabledAdvisory, PaymentConfirmation, PaymentProcessor,
};
use freight_market::config::EnvironmentConfig;
use freight_market::models::{QuoteDraft, StopDraft};
use freight_market::pricing::{LoadHandlingMethod, RateTable, VehicleClass};
use freight_market::repositories::Repositories;
use freight_market::state::{AppState, Collaborators};

/// Respuesta fija del procesador de pagos
#[derive(Clone)]
pub enum ProcessorBehaviour {
    Approve,
    Status(&'static str),
    Unreachable,
}

pub struct FakeProcessor {
    pub configured: bool,
    pub behaviour: ProcessorBehaviour,
    /// Número de llamadas a `confirm`, compartido con el test
    pub confirm_calls: Arc<AtomicUsize>,
}

impl FakeProcessor {
    pub fn new(configured: bool, behaviour: ProcessorBehaviour) -> Self {
        Self {
            configured,
            behaviour,
            confirm_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn approving() -> Self {
        Self::new(true, ProcessorBehaviour::Approve)
    }
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn client_key(&self) -> Option<String> {
        Some("test_ck".to_string())
    }

    async fn confirm(
        &self,
        payment_key: &str,
        order_id: &str,
        amount: i64,
    ) -> anyhow::Result<PaymentConfirmation> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        let status = match &self.behaviour {
            ProcessorBehaviour::Approve => "DONE",
            ProcessorBehaviour::Status(status) => status,
            ProcessorBehaviour::Unreachable => return Err(anyhow!("connection reset")),
        };
        Ok(PaymentConfirmation {
            payment_key: payment_key.to_string(),
            order_id: order_id.to_string(),
            status: status.to_string(),
            total_amount: Some(amount),
            approved_at: Some(Utc::now()),
        })
    }
}

/// Registro mercantil que aprueba todo
pub struct ApprovingRegistry;

#[async_trait]
impl BusinessRegistry for ApprovingRegistry {
    async fn validate(&self, _business: &BusinessValidation) -> anyhow::Result<Option<String>> {
        Ok(Some("01".to_string()))
    }
}

pub fn test_config() -> EnvironmentConfig {
    let values: HashMap<String, String> = [
        ("STORAGE_BACKEND", "memory"),
        ("JWT_SECRET", "integration-test-secret"),
        ("BCRYPT_COST", "4"),
        ("ENVIRONMENT", "test"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();
    EnvironmentConfig::from_map(&values).expect("test configuration")
}

pub fn rate_table() -> Arc<RateTable> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/resources/pricing_rate_table.json");
    Arc::new(RateTable::load_from_path(path).expect("rate table resource"))
}

pub fn state_with(processor: FakeProcessor) -> AppState {
    AppState::new(
        test_config(),
        Repositories::in_memory(),
        rate_table(),
        Collaborators {
            payment_processor: Arc::new(processor),
            business_registry: Arc::new(ApprovingRegistry),
            advisory: Arc::new(DisabledAdvisory),
        },
    )
}

pub fn test_state() -> AppState {
    state_with(FakeProcessor::approving())
}

/// Envío de 10 km en camión de 1 tonelada
pub fn draft() -> QuoteDraft {
    QuoteDraft {
        origin_address: "서울 강남구 테헤란로 1".into(),
        origin_lat: Some(37.5),
        origin_lng: Some(127.03),
        destination_address: "경기 성남시 분당구 2".into(),
        destination_lat: Some(37.38),
        destination_lng: Some(127.12),
        distance_km: 10,
        weight_kg: Some(600),
        volume_cbm: None,
        vehicle_class: VehicleClass::Ton1,
        vehicle_body_type: None,
        surcharge_codes: vec![],
        cargo_type: Some("가전".into()),
        cargo_desc: None,
        desired_price: None,
        allow_combine: false,
        load_method: LoadHandlingMethod::Shipper,
        unload_method: LoadHandlingMethod::Driver,
        stops: vec![StopDraft {
            seq: Some(1),
            address: "경기 성남시 수정구 3".into(),
            ..StopDraft::default()
        }],
        checklist: vec![],
    }
}
