use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

// Request para proponer un precio
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCounterOfferRequest {
    pub quote_id: Uuid,
    #[validate(range(min = 1))]
    pub proposed_price: i64,
    #[validate(length(max = 500))]
    pub message: Option<String>,
}
