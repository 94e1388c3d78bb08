use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};
use validator::Validate;

use crate::dto::surcharge_dto::SurchargeOptionRequest;
use crate::dto::ApiResponse;
use crate::models::{ChecklistItem, Principal, SurchargeOptionRecord};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Catálogo de checklist (público)
pub fn create_checklist_router() -> Router<AppState> {
    Router::new().route("/", get(list_checklist_items))
}

/// Recargos dinámicos (administradores)
pub fn create_surcharge_router() -> Router<AppState> {
    Router::new().route("/", get(list_surcharge_options).put(upsert_surcharge_option))
}

async fn list_checklist_items(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ChecklistItem>>>, AppError> {
    Ok(Json(ApiResponse::success(state.checklist.list_enabled().await?)))
}

async fn list_surcharge_options(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<SurchargeOptionRecord>>>, AppError> {
    Ok(Json(ApiResponse::success(state.surcharges.list_options(&principal).await?)))
}

async fn upsert_surcharge_option(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<SurchargeOptionRequest>,
) -> Result<Json<ApiResponse<SurchargeOptionRecord>>, AppError> {
    request.validate()?;
    let record = state.surcharges.upsert_option(&principal, request.into()).await?;
    Ok(Json(ApiResponse::success(record)))
}
