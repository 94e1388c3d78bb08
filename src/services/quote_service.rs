//! Servicio de presupuestos
//!
//! Crea, valida, lista, actualiza y borra presupuestos de un remitente.
//! Cada creación o actualización vuelve a calcular el precio con la
//! calculadora y guarda la instantánea junto al presupuesto.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use uuid::Uuid;

use crate::clients::AdvisoryGenerator;
use crate::models::{
    Principal, Quote, QuoteChecklistSelection, QuoteDetail, QuoteDraft, QuotePrices, QuoteStop,
    UserRole,
};
use crate::pricing::money::{round_half_up, to_won};
use crate::pricing::{PricingCalculator, PricingInput, PricingResult};
use crate::repositories::{ChecklistItemRepository, QuoteRepository};
use crate::services::authorization_service::{ensure_quote_owner, require_role};
use crate::services::keyed_locks::KeyedLocks;
use crate::services::surcharge_service::SurchargeService;
use crate::utils::errors::{conflict_error, invalid_input_error, not_found_error, AppResult};

/// Resultado de la validación previa
#[derive(Debug, Clone, serde::Serialize)]
pub struct QuoteValidation {
    pub estimated_min: i64,
    pub estimated_max: i64,
    pub estimated_weighted: i64,
    pub comments: Vec<String>,
}

pub struct QuoteService {
    quotes: Arc<dyn QuoteRepository>,
    checklist_items: Arc<dyn ChecklistItemRepository>,
    calculator: Arc<PricingCalculator>,
    surcharges: Arc<SurchargeService>,
    advisory: Arc<dyn AdvisoryGenerator>,
    locks: Arc<KeyedLocks>,
}

impl QuoteService {
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        checklist_items: Arc<dyn ChecklistItemRepository>,
        calculator: Arc<PricingCalculator>,
        surcharges: Arc<SurchargeService>,
        advisory: Arc<dyn AdvisoryGenerator>,
        locks: Arc<KeyedLocks>,
    ) -> Self {
        Self {
            quotes,
            checklist_items,
            calculator,
            surcharges,
            advisory,
            locks,
        }
    }

    /// Estimación de precio para unos parámetros de envío
    pub async fn price(&self, draft: &QuoteDraft) -> AppResult<PricingResult> {
        check_draft(draft)?;
        let rules = self
            .surcharges
            .resolve(draft.vehicle_body_type.as_deref(), &draft.surcharge_codes)
            .await?;

        let result = self.calculator.estimate(&PricingInput {
            distance_km: draft.distance_km,
            vehicle_class: draft.vehicle_class,
            surcharges: &rules,
            load_method: draft.load_method,
            unload_method: draft.unload_method,
            combined_shipment: draft.allow_combine,
        })?;
        Ok(result)
    }

    /// Crear presupuesto en estado OPEN
    pub async fn create(&self, principal: &Principal, draft: &QuoteDraft) -> AppResult<QuoteDetail> {
        require_role(principal, UserRole::Shipper, "create quote")?;

        let pricing = self.price(draft).await?;
        let prices = QuotePrices::from_pricing(&pricing, draft.desired_price)?;
        let quote = Quote::new(principal.user_id, draft, prices);
        let (stops, checklist) = self.build_children(quote.id, draft).await?;

        self.quotes.insert(&quote, &stops, &checklist).await?;

        tracing::info!(
            "📦 Presupuesto {} creado por {} ({} km, {}, final {} KRW)",
            quote.id,
            principal.user_id,
            quote.distance_km,
            quote.vehicle_class,
            quote.final_price
        );

        Ok(QuoteDetail {
            quote,
            stops: sorted_stops(stops),
            checklist,
        })
    }

    /// Estimación con comentarios, sin persistir
    pub async fn validate(&self, principal: &Principal, draft: &QuoteDraft) -> AppResult<QuoteValidation> {
        require_role(principal, UserRole::Shipper, "validate quote")?;

        let pricing = self.price(draft).await?;
        let mut comments = pricing_comments(draft, &pricing);

        let prompt = advisory_prompt(draft, &pricing, &comments);
        if let Some(advice) = self.advisory.generate(&prompt).await {
            comments.push(advice);
        }

        Ok(QuoteValidation {
            estimated_min: to_won(pricing.total_min_won)?,
            estimated_max: to_won(pricing.total_max_won)?,
            estimated_weighted: to_won(pricing.weighted_won)?,
            comments,
        })
    }

    /// Presupuestos del remitente, más recientes primero
    pub async fn list(&self, principal: &Principal) -> AppResult<Vec<Quote>> {
        require_role(principal, UserRole::Shipper, "list quotes")?;
        self.quotes.find_by_shipper(principal.user_id).await
    }

    pub async fn get(&self, principal: &Principal, quote_id: Uuid) -> AppResult<QuoteDetail> {
        let quote = self.owned_quote(principal, quote_id, "read quote").await?;
        self.detail(quote).await
    }

    /// Sustituye parámetros, hijos y precios. Solo mientras está OPEN.
    pub async fn update(
        &self,
        principal: &Principal,
        quote_id: Uuid,
        draft: &QuoteDraft,
    ) -> AppResult<QuoteDetail> {
        let _guard = self.locks.lock(quote_id).await;
        let mut quote = self.owned_quote(principal, quote_id, "update quote").await?;
        if !quote.is_open() {
            return Err(conflict_error(format!("quote is {} and cannot be updated", quote.status)));
        }

        let pricing = self.price(draft).await?;
        quote.apply(draft, QuotePrices::from_pricing(&pricing, draft.desired_price)?);
        let (stops, checklist) = self.build_children(quote.id, draft).await?;

        self.quotes.replace(&quote, &stops, &checklist).await?;
        tracing::info!("📝 Presupuesto {} actualizado (final {} KRW)", quote.id, quote.final_price);

        Ok(QuoteDetail {
            quote,
            stops: sorted_stops(stops),
            checklist,
        })
    }

    /// Borra el presupuesto con sus hijos si ningún match activo lo referencia
    pub async fn delete(&self, principal: &Principal, quote_id: Uuid) -> AppResult<()> {
        let _guard = self.locks.lock(quote_id).await;
        self.owned_quote(principal, quote_id, "delete quote").await?;

        if !self.quotes.delete_if_unmatched(quote_id).await? {
            return Err(conflict_error("quote has an active match and cannot be deleted"));
        }
        tracing::info!("🗑️ Presupuesto {} borrado", quote_id);
        Ok(())
    }

    async fn owned_quote(&self, principal: &Principal, quote_id: Uuid, operation: &str) -> AppResult<Quote> {
        let quote = self
            .quotes
            .find_by_id(quote_id)
            .await?
            .ok_or_else(|| not_found_error("Quote", quote_id))?;
        ensure_quote_owner(principal, &quote, operation)?;
        Ok(quote)
    }

    async fn detail(&self, quote: Quote) -> AppResult<QuoteDetail> {
        let stops = self.quotes.find_stops(quote.id).await?;
        let checklist = self.quotes.find_checklist(quote.id).await?;
        Ok(QuoteDetail {
            quote,
            stops,
            checklist,
        })
    }

    /// Paradas sin dirección se descartan. Cada selección debe apuntar a un
    /// elemento habilitado del catálogo; el recargo por defecto es el del
    /// elemento.
    async fn build_children(
        &self,
        quote_id: Uuid,
        draft: &QuoteDraft,
    ) -> AppResult<(Vec<QuoteStop>, Vec<QuoteChecklistSelection>)> {
        let stops = draft
            .stops
            .iter()
            .filter_map(|stop| QuoteStop::from_draft(quote_id, stop))
            .collect();

        if draft.checklist.is_empty() {
            return Ok((stops, Vec::new()));
        }

        let ids: Vec<Uuid> = draft.checklist.iter().map(|s| s.checklist_item_id).collect();
        let items: HashMap<Uuid, _> = self
            .checklist_items
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .filter(|item| item.enabled)
            .map(|item| (item.id, item))
            .collect();

        let mut checklist = Vec::with_capacity(draft.checklist.len());
        for selection in &draft.checklist {
            let item = items.get(&selection.checklist_item_id).ok_or_else(|| {
                invalid_input_error(format!("unknown checklist item: {}", selection.checklist_item_id))
            })?;

            let has_input = selection
                .extra_input
                .as_deref()
                .map_or(false, |input| !input.trim().is_empty());
            if item.requires_extra_input && !has_input {
                return Err(invalid_input_error(format!(
                    "checklist item '{}' requires extra input",
                    item.name
                )));
            }
            if selection.extra_fee.map_or(false, |fee| fee < 0) {
                return Err(invalid_input_error("checklist extra fee must not be negative"));
            }

            let mut record = QuoteChecklistSelection::from_draft(quote_id, selection);
            if selection.extra_fee.is_none() && item.has_extra_fee {
                record.extra_fee = item.base_extra_fee;
            }
            checklist.push(record);
        }

        Ok((stops, checklist))
    }
}

fn check_draft(draft: &QuoteDraft) -> AppResult<()> {
    if draft.origin_address.trim().is_empty() || draft.destination_address.trim().is_empty() {
        return Err(invalid_input_error("origin and destination addresses are required"));
    }
    if draft.distance_km <= 0 {
        return Err(invalid_input_error("distance must be a positive number of km"));
    }
    if draft.weight_kg.map_or(false, |w| w < 0) || draft.volume_cbm.map_or(false, |v| v < 0) {
        return Err(invalid_input_error("weight and volume must not be negative"));
    }
    if draft.desired_price.map_or(false, |p| p < 0) {
        return Err(invalid_input_error("desired price must not be negative"));
    }
    Ok(())
}

fn sorted_stops(mut stops: Vec<QuoteStop>) -> Vec<QuoteStop> {
    stops.sort_by_key(|stop| stop.seq);
    stops
}

/// Comentarios deterministas: puja baja y capacidad del vehículo
pub fn pricing_comments(draft: &QuoteDraft, pricing: &PricingResult) -> Vec<String> {
    let mut comments = Vec::new();

    if let Some(desired) = draft.desired_price.filter(|price| *price > 0) {
        let threshold = round_half_up(pricing.total_min_won * Decimal::new(85, 2));
        if Decimal::from(desired) < threshold {
            comments.push("희망금액이 예상 최저가의 85% 미만입니다. 매칭이 어려울 수 있어요.".to_string());
        }
    }

    if let Some(weight) = draft.weight_kg.filter(|weight| *weight > 0) {
        let vehicle = draft.vehicle_class;
        let capacity = vehicle.default_capacity_kg();
        let next = vehicle.next_higher();

        if weight > capacity {
            comments.push(match next {
                Some(next) => format!(
                    "화물 중량이 선택 차량 적재한도({}kg)를 초과합니다. {} 이상 차량을 선택해 주세요.",
                    capacity, next
                ),
                None => format!(
                    "화물 중량이 선택 차량 적재한도({}kg)를 초과합니다. 상위 차량을 선택해 주세요.",
                    capacity
                ),
            });
        } else if i64::from(weight) * 10 > i64::from(capacity) * 9 {
            if let Some(next) = next {
                comments.push(format!(
                    "화물 중량이 적재한도({}kg)의 90% 이상입니다. 여유를 위해 {} 차량을 검토해 주세요.",
                    capacity, next
                ));
            }
        }
    }

    comments
}

fn advisory_prompt(draft: &QuoteDraft, pricing: &PricingResult, comments: &[String]) -> String {
    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    let mut prompt = String::new();
    prompt.push_str("화주 견적 검증 조언을 1~2문장으로 간결하게 작성해줘. 단정적인 표현은 피해줘. ");
    prompt.push_str("화물 정보를 보고 필요한 체크리스트(파손주의, 습기주의, 세워서 적재 등)가 있으면 추천해줘.\n");
    prompt.push_str("입력 요약:\n");
    let _ = writeln!(prompt, "- 거리(km): {}", draft.distance_km);
    let _ = writeln!(prompt, "- 차량: {}", draft.vehicle_class);
    let _ = writeln!(prompt, "- 차량 옵션: {}", show(draft.vehicle_body_type.clone()));
    let _ = writeln!(prompt, "- 화물 종류: {}", show(draft.cargo_type.clone()));
    let _ = writeln!(prompt, "- 화물 설명: {}", show(draft.cargo_desc.clone()));
    let _ = writeln!(prompt, "- 화물 중량(kg): {}", show(draft.weight_kg.map(|w| w.to_string())));
    let _ = writeln!(prompt, "- 희망금액: {}", show(draft.desired_price.map(|p| p.to_string())));
    let _ = writeln!(prompt, "- 상/하차: {} / {}", draft.load_method, draft.unload_method);
    prompt.push_str("예상 요금 범위:\n");
    let _ = writeln!(prompt, "- 최소: {}", pricing.total_min_won);
    let _ = writeln!(prompt, "- 최대: {}", pricing.total_max_won);
    if !comments.is_empty() {
        prompt.push_str("이미 생성된 경고:\n");
        for comment in comments {
            let _ = writeln!(prompt, "- {}", comment);
        }
    }
    prompt
}
