use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::counter_offer_dto::CreateCounterOfferRequest;
use crate::dto::ApiResponse;
use crate::models::{CounterOffer, Principal};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_counter_offer_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_offer))
        .route("/mine", get(my_offers))
        .route("/:id/accept", post(accept_offer))
        .route("/:id/reject", post(reject_offer))
}

async fn create_offer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateCounterOfferRequest>,
) -> Result<Json<ApiResponse<CounterOffer>>, AppError> {
    request.validate()?;
    let offer = state
        .counter_offers
        .create(&principal, request.quote_id, request.proposed_price, request.message)
        .await?;
    Ok(Json(ApiResponse::success_with_message(offer, "금액 제안이 등록되었습니다.")))
}

async fn my_offers(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<CounterOffer>>>, AppError> {
    Ok(Json(ApiResponse::success(state.counter_offers.mine(&principal).await?)))
}

async fn accept_offer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CounterOffer>>, AppError> {
    Ok(Json(ApiResponse::success(state.counter_offers.accept(&principal, id).await?)))
}

async fn reject_offer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CounterOffer>>, AppError> {
    Ok(Json(ApiResponse::success(state.counter_offers.reject(&principal, id).await?)))
}
