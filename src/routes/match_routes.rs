use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::dto::match_dto::CreateMatchRequest;
use crate::dto::ApiResponse;
use crate::models::{Match, Payment, Principal, UserRole};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_match_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_match))
        .route("/open", get(open_matches))
        .route("/mine", get(my_matches))
        .route("/:id", get(get_match))
        .route("/:id/accept", post(accept_match))
        .route("/:id/cancel", post(cancel_match))
        .route("/:id/start", post(start_transit))
        .route("/:id/complete", post(complete_match))
        .route("/:id/payments", get(match_payments))
}

async fn create_match(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateMatchRequest>,
) -> Result<Json<ApiResponse<Match>>, AppError> {
    let record = state.matches.create(&principal, request.quote_id).await?;
    Ok(Json(ApiResponse::success_with_message(record, "매칭이 생성되었습니다.")))
}

async fn open_matches(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<Match>>>, AppError> {
    Ok(Json(ApiResponse::success(state.matches.open_matches(&principal).await?)))
}

/// Conductor: sus matches aceptados. Remitente: los de sus presupuestos.
async fn my_matches(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<Match>>>, AppError> {
    let matches = match principal.role {
        UserRole::Driver => state.matches.driver_matches(&principal).await?,
        _ => state.matches.shipper_matches(&principal).await?,
    };
    Ok(Json(ApiResponse::success(matches)))
}

async fn get_match(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Match>>, AppError> {
    Ok(Json(ApiResponse::success(state.matches.get(&principal, id).await?)))
}

async fn accept_match(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Match>>, AppError> {
    let record = state.matches.accept(&principal, id).await?;
    Ok(Json(ApiResponse::success_with_message(record, "매칭을 수락했습니다.")))
}

async fn cancel_match(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Match>>, AppError> {
    let record = state.matches.cancel(&principal, id).await?;
    Ok(Json(ApiResponse::success_with_message(record, "매칭이 취소되었습니다.")))
}

async fn start_transit(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Match>>, AppError> {
    Ok(Json(ApiResponse::success(state.matches.start_transit(&principal, id).await?)))
}

async fn complete_match(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Match>>, AppError> {
    Ok(Json(ApiResponse::success(state.matches.complete(&principal, id).await?)))
}

async fn match_payments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, AppError> {
    Ok(Json(ApiResponse::success(state.payments.by_match(&principal, id).await?)))
}
