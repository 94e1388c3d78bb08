//! Servicio de pagos
//!
//! Solo el remitente dueño del presupuesto de un match puede crear, preparar,
//! confirmar o leer sus pagos. Un pago sale de PENDING exactamente una vez.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::clients::PaymentProcessor;
use crate::models::{Match, Payment, PaymentMethod, Principal, Quote, UserRole};
use crate::repositories::{MatchRepository, PaymentRepository, QuoteRepository};
use crate::services::authorization_service::{ensure_quote_owner, require_role};
use crate::services::keyed_locks::KeyedLocks;
use crate::utils::errors::{
    conflict_error, invalid_input_error, not_found_error, AppError, AppResult,
};

pub const MIN_PREPARE_AMOUNT: i64 = 100;
pub const DEFAULT_ORDER_NAME: &str = "화물운송 결제";

/// Datos para abrir la ventana de pago del procesador
#[derive(Debug, Clone, serde::Serialize)]
pub struct PreparedPayment {
    pub payment_id: Uuid,
    pub order_id: String,
    pub amount: i64,
    pub order_name: String,
    pub client_key: String,
}

/// Alta manual de un pago
#[derive(Debug, Clone, Default)]
pub struct NewPayment {
    pub order_no: Option<String>,
    pub method: Option<PaymentMethod>,
    pub amount: Option<i64>,
    pub amount_type: Option<String>,
}

pub struct PaymentService {
    quotes: Arc<dyn QuoteRepository>,
    matches: Arc<dyn MatchRepository>,
    payments: Arc<dyn PaymentRepository>,
    processor: Arc<dyn PaymentProcessor>,
    locks: KeyedLocks,
}

impl PaymentService {
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        matches: Arc<dyn MatchRepository>,
        payments: Arc<dyn PaymentRepository>,
        processor: Arc<dyn PaymentProcessor>,
    ) -> Self {
        Self {
            quotes,
            matches,
            payments,
            processor,
            locks: KeyedLocks::new(),
        }
    }

    /// Pago PENDING manual. El importe por defecto es el precio deseado
    /// del presupuesto.
    pub async fn create(&self, principal: &Principal, match_id: Uuid, request: NewPayment) -> AppResult<Payment> {
        let (_, quote) = self.owned_match(principal, match_id, "create payment").await?;

        let amount = request.amount.unwrap_or(quote.desired_price);
        if amount <= 0 {
            return Err(invalid_input_error("payment amount must be positive"));
        }
        let order_no = request
            .order_no
            .map(|no| no.trim().to_string())
            .filter(|no| !no.is_empty())
            .unwrap_or_else(manual_order_no);

        let mut payment = Payment::new(match_id, order_no, request.method.unwrap_or_default(), amount);
        payment.amount_type = request.amount_type;
        self.payments.insert(&payment).await?;

        tracing::info!("💳 Pago {} ({}) creado para el match {}", payment.id, payment.order_no, match_id);
        Ok(payment)
    }

    /// Registra un pago PENDING y devuelve lo necesario para la ventana de pago
    pub async fn prepare(
        &self,
        principal: &Principal,
        match_id: Uuid,
        amount: i64,
        order_name: Option<String>,
    ) -> AppResult<PreparedPayment> {
        self.owned_match(principal, match_id, "prepare payment").await?;
        if !self.processor.is_configured() {
            return Err(invalid_input_error("payment processor is not configured"));
        }
        if amount < MIN_PREPARE_AMOUNT {
            return Err(invalid_input_error(format!(
                "payment amount must be at least {}",
                MIN_PREPARE_AMOUNT
            )));
        }

        let order_id = processor_order_id();
        let order_name = order_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_ORDER_NAME.to_string());

        let mut payment = Payment::new(match_id, order_id.clone(), PaymentMethod::Card, amount);
        payment.order_name = Some(order_name.clone());
        self.payments.insert(&payment).await?;

        tracing::info!("💳 Pago {} preparado: {} KRW", order_id, amount);
        Ok(PreparedPayment {
            payment_id: payment.id,
            order_id,
            amount,
            order_name,
            client_key: self.processor.client_key().unwrap_or_default(),
        })
    }

    /// Confirma con el procesador. Cualquier fallo deja el pago en FAILED
    /// antes de devolver el error.
    pub async fn confirm(
        &self,
        principal: &Principal,
        payment_key: &str,
        order_id: &str,
        amount: i64,
    ) -> AppResult<Payment> {
        let payment = self
            .payments
            .find_by_order_no(order_id)
            .await?
            .ok_or_else(|| not_found_error("Payment", order_id))?;
        self.owned_match(principal, payment.match_id, "confirm payment").await?;

        let _guard = self.locks.lock(payment.id).await;
        let mut payment = self
            .payments
            .find_by_id(payment.id)
            .await?
            .ok_or_else(|| not_found_error("Payment", order_id))?;
        if !payment.is_pending() {
            return Err(conflict_error(format!("payment is already {}", payment.status)));
        }

        if payment.amount != amount {
            let reason = format!("amount mismatch: expected {}, got {}", payment.amount, amount);
            self.settle_failed(&mut payment, &reason).await?;
            return Err(invalid_input_error(reason));
        }

        let confirmation = match self.processor.confirm(payment_key, order_id, amount).await {
            Ok(confirmation) => confirmation,
            Err(e) => {
                self.settle_failed(&mut payment, &format!("processor error: {}", e)).await?;
                return Err(AppError::ServiceUnavailable(
                    "payment processor is unavailable".to_string(),
                ));
            }
        };
        if !confirmation.is_done() {
            let reason = format!("payment status {}", confirmation.status);
            self.settle_failed(&mut payment, &reason).await?;
            return Err(invalid_input_error(reason));
        }

        let paid_at = confirmation.approved_at.unwrap_or_else(Utc::now);
        payment.complete(paid_at, confirmation.payment_key)?;
        if !self.payments.update_if_pending(&payment).await? {
            return Err(conflict_error("payment was settled concurrently"));
        }

        tracing::info!("✅ Pago {} completado ({} KRW)", payment.order_no, payment.amount);
        Ok(payment)
    }

    pub async fn get(&self, principal: &Principal, payment_id: Uuid) -> AppResult<Payment> {
        let payment = self
            .payments
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| not_found_error("Payment", payment_id))?;
        self.owned_match(principal, payment.match_id, "read payment").await?;
        Ok(payment)
    }

    pub async fn by_match(&self, principal: &Principal, match_id: Uuid) -> AppResult<Vec<Payment>> {
        self.owned_match(principal, match_id, "list payments").await?;
        self.payments.find_by_match(match_id).await
    }

    /// Pagos de todos los matches del remitente, más recientes primero
    pub async fn mine(&self, principal: &Principal) -> AppResult<Vec<Payment>> {
        require_role(principal, UserRole::Shipper, "list payments")?;
        self.payments.find_by_shipper(principal.user_id).await
    }

    async fn settle_failed(&self, payment: &mut Payment, reason: &str) -> AppResult<()> {
        payment.fail(reason)?;
        if !self.payments.update_if_pending(payment).await? {
            return Err(conflict_error("payment was settled concurrently"));
        }
        tracing::warn!("⚠️ Pago {} fallido: {}", payment.order_no, reason);
        Ok(())
    }

    async fn owned_match(&self, principal: &Principal, match_id: Uuid, operation: &str) -> AppResult<(Match, Quote)> {
        let record = self
            .matches
            .find_by_id(match_id)
            .await?
            .ok_or_else(|| not_found_error("Match", match_id))?;
        let quote = self
            .quotes
            .find_by_id(record.quote_id)
            .await?
            .ok_or_else(|| not_found_error("Quote", record.quote_id))?;
        ensure_quote_owner(principal, &quote, operation)?;
        Ok((record, quote))
    }
}

fn manual_order_no() -> String {
    let id = Uuid::new_v4().to_string();
    format!("ORD-{}", id[..8].to_uppercase())
}

fn processor_order_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("FRT-{}", id[..16].to_uppercase())
}
