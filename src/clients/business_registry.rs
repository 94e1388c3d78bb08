//! Validador del registro mercantil (estilo odcloud)
//!
//! Solo el código de validez "01" se considera empresa válida.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::BusinessRegistryConfig;

pub const VALID_BUSINESS_CODE: &str = "01";

/// Datos que se envían a validar
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessValidation {
    pub business_number: String,
    pub opening_date: String,
    pub representative_name: String,
    pub company_name: Option<String>,
    pub address: Option<String>,
}

#[async_trait]
pub trait BusinessRegistry: Send + Sync {
    /// Devuelve el código de validez del primer resultado, si lo hay
    async fn validate(&self, business: &BusinessValidation) -> Result<Option<String>>;
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    businesses: Vec<ValidateBusiness<'a>>,
}

#[derive(Debug, Serialize)]
struct ValidateBusiness<'a> {
    b_no: &'a str,
    start_dt: &'a str,
    p_nm: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    b_nm: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    b_adr: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    #[serde(default)]
    data: Vec<ValidationData>,
}

#[derive(Debug, Deserialize)]
struct ValidationData {
    valid: Option<String>,
}

pub struct OdcloudClient {
    client: reqwest::Client,
    config: BusinessRegistryConfig,
}

impl OdcloudClient {
    pub fn new(client: reqwest::Client, config: BusinessRegistryConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl BusinessRegistry for OdcloudClient {
    async fn validate(&self, business: &BusinessValidation) -> Result<Option<String>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("business registry api key is not set"))?;

        let url = format!("{}/validate", self.config.base_url.trim_end_matches('/'));
        log::info!("🏢 Validando número de empresa {}", business.business_number);

        let request = ValidateRequest {
            businesses: vec![ValidateBusiness {
                b_no: &business.business_number,
                start_dt: &business.opening_date,
                p_nm: &business.representative_name,
                b_nm: business.company_name.as_deref(),
                b_adr: business.address.as_deref(),
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("serviceKey", api_key), ("returnType", "JSON")])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::error!("❌ Registro mercantil respondió {}", status);
            return Err(anyhow!("business registry returned {}", status));
        }

        let body: ValidateResponse = response.json().await?;
        Ok(body.data.into_iter().next().and_then(|data| data.valid))
    }
}
