use serde::Deserialize;
use uuid::Uuid;

// Request para crear un match
#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub quote_id: Uuid,
}
