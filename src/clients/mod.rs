//! Clients - HTTP Clients for External APIs
//!
//! Colaboradores externos detrás de traits: procesador de pagos, validador
//! del registro mercantil y generador de texto de asesoramiento. Los
//! servicios solo dependen de los traits; los tests usan dobles.

pub mod advisory;
pub mod business_registry;
pub mod payment_processor;

pub use advisory::{AdvisoryGenerator, ChatAdvisoryClient, DisabledAdvisory};
pub use business_registry::{BusinessRegistry, BusinessValidation, OdcloudClient, VALID_BUSINESS_CODE};
pub use payment_processor::{PaymentConfirmation, PaymentProcessor, TossPaymentsClient};

use std::time::Duration;

/// Cliente HTTP compartido por los clientes externos
pub fn build_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent("FreightMarket/1.0")
        .build()?;
    Ok(client)
}
