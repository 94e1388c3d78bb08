//! Resolución de recargos
//!
//! Combina el catálogo estático con los registros dinámicos: un registro
//! habilitado sustituye la regla del mismo código y uno deshabilitado la
//! retira.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Principal, SurchargeOptionRecord, UserRole};
use crate::pricing::surcharge::{built_in_rule, code_for_body_type};
use crate::pricing::{PricingError, SurchargeRule};
use crate::repositories::SurchargeOptionRepository;
use crate::services::authorization_service::require_role;
use crate::utils::errors::AppResult;

pub struct SurchargeService {
    repository: Arc<dyn SurchargeOptionRepository>,
}

impl SurchargeService {
    pub fn new(repository: Arc<dyn SurchargeOptionRepository>) -> Self {
        Self { repository }
    }

    /// Reglas para un tipo de carrocería y una lista de códigos explícitos.
    ///
    /// El código derivado de la carrocería se omite si su registro está
    /// deshabilitado; un código explícito desconocido o deshabilitado es
    /// un error de entrada.
    pub async fn resolve(&self, body_type: Option<&str>, codes: &[String]) -> AppResult<Vec<SurchargeRule>> {
        let body_code = body_type.and_then(code_for_body_type).map(str::to_string);

        let mut requested: Vec<(String, bool)> = Vec::new();
        if let Some(code) = body_code {
            requested.push((code, false));
        }
        for code in codes {
            let code = code.trim().to_ascii_uppercase();
            if code.is_empty() || requested.iter().any(|(c, _)| *c == code) {
                continue;
            }
            requested.push((code, true));
        }
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let lookup: Vec<String> = requested.iter().map(|(code, _)| code.clone()).collect();
        let records: HashMap<String, SurchargeOptionRecord> = self
            .repository
            .find_by_codes(&lookup)
            .await?
            .into_iter()
            .map(|record| (record.code.clone(), record))
            .collect();

        let mut rules = Vec::with_capacity(requested.len());
        for (code, explicit) in requested {
            let rule = match records.get(&code) {
                Some(record) if record.enabled => Some(SurchargeRule::try_from(record)?),
                Some(_) => None,
                None => built_in_rule(&code),
            };
            match rule {
                Some(rule) => rules.push(rule),
                None if explicit => return Err(PricingError::UnknownSurcharge(code).into()),
                None => tracing::debug!("Recargo {} deshabilitado, se omite", code),
            }
        }
        Ok(rules)
    }

    /// Registros dinámicos (solo administradores)
    pub async fn list_options(&self, principal: &Principal) -> AppResult<Vec<SurchargeOptionRecord>> {
        require_role(principal, UserRole::Admin, "list surcharge options")?;
        self.repository.find_all().await
    }

    /// Crea o sustituye un registro dinámico (solo administradores)
    pub async fn upsert_option(
        &self,
        principal: &Principal,
        mut record: SurchargeOptionRecord,
    ) -> AppResult<SurchargeOptionRecord> {
        require_role(principal, UserRole::Admin, "update surcharge options")?;
        record.code = record.code.trim().to_ascii_uppercase();
        // Un registro mal formado no llega a la tabla
        SurchargeRule::try_from(&record)?;
        record.updated_at = chrono::Utc::now();
        self.repository.upsert(&record).await?;
        tracing::info!("🧾 Recargo {} actualizado (habilitado: {})", record.code, record.enabled);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{SurchargeKind, SurchargeOptionType};
    use crate::repositories::memory::MemoryStore;
    use crate::utils::errors::AppError;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn service() -> SurchargeService {
        SurchargeService::new(Arc::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn test_body_type_and_explicit_codes_are_merged() {
        let rules = service()
            .resolve(Some("top"), &["cold_chain".to_string(), "WINGBODY_TOP".to_string()])
            .await
            .unwrap();
        let codes: Vec<&str> = rules.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["WINGBODY_TOP", "COLD_CHAIN"]);
    }

    #[tokio::test]
    async fn test_unknown_explicit_code_is_rejected() {
        let result = service().resolve(None, &["TELEPORT".to_string()]).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_plain_body_types_have_no_surcharge() {
        let rules = service().resolve(Some("WINGBODY"), &[]).await.unwrap();
        assert!(rules.is_empty());
    }

    #[tokio::test]
    async fn test_dynamic_record_overrides_and_disables() {
        let service = service();
        let admin = Principal::admin(Uuid::new_v4());

        let mut fixed = SurchargeOptionRecord::new("wingbody_top", SurchargeOptionType::Fixed);
        fixed.fixed_add_won = Some(45_000);
        service.upsert_option(&admin, fixed).await.unwrap();

        let rules = service.resolve(Some("TOP"), &[]).await.unwrap();
        assert_eq!(rules[0].kind, SurchargeKind::Fixed { amount: Decimal::from(45_000) });

        let mut disabled = SurchargeOptionRecord::new("LIFT", SurchargeOptionType::Fixed);
        disabled.fixed_add_won = Some(1);
        disabled.enabled = false;
        service.upsert_option(&admin, disabled).await.unwrap();

        assert!(service.resolve(Some("LIFT"), &[]).await.unwrap().is_empty());
        assert!(service.resolve(None, &["LIFT".to_string()]).await.is_err());
    }

    #[tokio::test]
    async fn test_upsert_rejects_unbounded_multiplier() {
        let service = service();
        let admin = Principal::admin(Uuid::new_v4());

        let mut record = SurchargeOptionRecord::new("HUGE", SurchargeOptionType::Mult);
        record.min_multiplier = Some(Decimal::ONE);
        record.max_multiplier = Some(Decimal::MAX);
        let result = service.upsert_option(&admin, record).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        assert!(service.list_options(&admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_admin_can_upsert() {
        let record = SurchargeOptionRecord::new("X", SurchargeOptionType::Fixed);
        let result = service()
            .upsert_option(&Principal::shipper(Uuid::new_v4()), record)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_incomplete_record_is_rejected() {
        let record = SurchargeOptionRecord::new("HALF", SurchargeOptionType::Add);
        let result = service()
            .upsert_option(&Principal::admin(Uuid::new_v4()), record)
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
