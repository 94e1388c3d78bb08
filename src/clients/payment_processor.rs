//! Procesador de pagos estilo Toss
//!
//! Solo se usa la confirmación. La preparación ocurre en la ventana de pago
//! del frontend con orderId/amount/clientKey.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PaymentConfig;

/// Resultado de la confirmación
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfirmation {
    pub payment_key: String,
    pub order_id: String,
    pub status: String,
    pub total_amount: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl PaymentConfirmation {
    pub fn is_done(&self) -> bool {
        self.status.eq_ignore_ascii_case("DONE")
    }
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Si hay credenciales para preparar y confirmar
    fn is_configured(&self) -> bool;

    /// Clave pública que el frontend usa para abrir la ventana de pago
    fn client_key(&self) -> Option<String>;

    async fn confirm(&self, payment_key: &str, order_id: &str, amount: i64) -> Result<PaymentConfirmation>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest<'a> {
    payment_key: &'a str,
    order_id: &'a str,
    amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmResponse {
    payment_key: Option<String>,
    order_id: Option<String>,
    status: Option<String>,
    total_amount: Option<i64>,
    approved_at: Option<String>,
}

pub struct TossPaymentsClient {
    client: reqwest::Client,
    config: PaymentConfig,
}

impl TossPaymentsClient {
    pub fn new(client: reqwest::Client, config: PaymentConfig) -> Self {
        Self { client, config }
    }

    fn authorization(secret_key: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:", secret_key)))
    }
}

#[async_trait]
impl PaymentProcessor for TossPaymentsClient {
    fn is_configured(&self) -> bool {
        self.config
            .secret_key
            .as_deref()
            .map_or(false, |key| !key.trim().is_empty())
    }

    fn client_key(&self) -> Option<String> {
        self.config.client_key.clone()
    }

    async fn confirm(&self, payment_key: &str, order_id: &str, amount: i64) -> Result<PaymentConfirmation> {
        let secret_key = self
            .config
            .secret_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("payment processor secret key is not set"))?;

        log::info!("💳 Confirmando pago {} por {} KRW", order_id, amount);

        let response = self
            .client
            .post(&self.config.confirm_url)
            .header(reqwest::header::AUTHORIZATION, Self::authorization(secret_key))
            .json(&ConfirmRequest {
                payment_key,
                order_id,
                amount,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Confirmación rechazada con estado {}: {}", status, error_text);
            return Err(anyhow!("payment confirmation failed: {}", status));
        }

        let body: ConfirmResponse = response.json().await?;
        Ok(PaymentConfirmation {
            payment_key: body.payment_key.unwrap_or_else(|| payment_key.to_string()),
            order_id: body.order_id.unwrap_or_else(|| order_id.to_string()),
            status: body.status.unwrap_or_default(),
            total_amount: body.total_amount,
            approved_at: body.approved_at.as_deref().and_then(parse_approved_at),
        })
    }
}

/// Acepta RFC 3339 con zona o una fecha local sin zona
fn parse_approved_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_authorization_uses_secret_with_colon() {
        assert_eq!(
            TossPaymentsClient::authorization("test_sk"),
            format!("Basic {}", STANDARD.encode("test_sk:"))
        );
    }

    #[test]
    fn test_parse_approved_at() {
        let parsed = parse_approved_at("2024-03-01T12:00:00+09:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T03:00:00+00:00");
        assert!(parse_approved_at("2024-03-01T12:00:00").is_some());
        assert!(parse_approved_at("").is_none());
        assert!(parse_approved_at("yesterday").is_none());
    }

    #[test]
    fn test_unconfigured_without_secret() {
        let client = TossPaymentsClient::new(reqwest::Client::new(), PaymentConfig::default());
        assert!(!client.is_configured());
    }
}
