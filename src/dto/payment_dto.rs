use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::PaymentMethod;
use crate::services::NewPayment;
use crate::utils::validation::validate_not_blank;

// Request para un pago manual
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub match_id: Uuid,
    #[validate(length(max = 64))]
    pub order_no: Option<String>,
    pub method: Option<PaymentMethod>,
    #[validate(range(min = 1))]
    pub amount: Option<i64>,
    pub amount_type: Option<String>,
}

impl CreatePaymentRequest {
    pub fn into_parts(self) -> (Uuid, NewPayment) {
        (
            self.match_id,
            NewPayment {
                order_no: self.order_no,
                method: self.method,
                amount: self.amount,
                amount_type: self.amount_type,
            },
        )
    }
}

// Request para preparar la ventana de pago
#[derive(Debug, Deserialize, Validate)]
pub struct PreparePaymentRequest {
    pub match_id: Uuid,
    pub amount: i64,
    #[validate(length(max = 100))]
    pub order_name: Option<String>,
}

// Request de confirmación tras la ventana de pago
#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmPaymentRequest {
    #[validate(custom = "validate_not_blank")]
    pub payment_key: String,
    #[validate(custom = "validate_not_blank")]
    pub order_id: String,
    pub amount: i64,
}
