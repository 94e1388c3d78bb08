use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::quote_dto::QuoteRequest;
use crate::dto::ApiResponse;
use crate::models::{CounterOffer, Match, Principal, Quote, QuoteDetail};
use crate::pricing::PricingResult;
use crate::services::QuoteValidation;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_quote_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_quote).get(list_quotes))
        .route("/estimate", post(estimate))
        .route("/validate", post(validate_quote))
        .route("/:id", get(get_quote).put(update_quote).delete(delete_quote))
        .route("/:id/match", get(quote_match))
        .route("/:id/counter-offers", get(quote_counter_offers))
}

async fn estimate(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<PricingResult>>, AppError> {
    request.validate()?;
    let pricing = state.quotes.price(&request.into_draft()?).await?;
    Ok(Json(ApiResponse::success(pricing)))
}

async fn validate_quote(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<QuoteValidation>>, AppError> {
    request.validate()?;
    let validation = state.quotes.validate(&principal, &request.into_draft()?).await?;
    Ok(Json(ApiResponse::success(validation)))
}

async fn create_quote(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<QuoteDetail>>, AppError> {
    request.validate()?;
    let detail = state.quotes.create(&principal, &request.into_draft()?).await?;
    Ok(Json(ApiResponse::success_with_message(detail, "견적이 등록되었습니다.")))
}

async fn list_quotes(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<Quote>>>, AppError> {
    Ok(Json(ApiResponse::success(state.quotes.list(&principal).await?)))
}

async fn get_quote(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<QuoteDetail>>, AppError> {
    Ok(Json(ApiResponse::success(state.quotes.get(&principal, id).await?)))
}

async fn update_quote(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<QuoteDetail>>, AppError> {
    request.validate()?;
    let detail = state.quotes.update(&principal, id, &request.into_draft()?).await?;
    Ok(Json(ApiResponse::success_with_message(detail, "견적이 수정되었습니다.")))
}

async fn delete_quote(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.quotes.delete(&principal, id).await?;
    Ok(Json(ApiResponse::message("견적이 삭제되었습니다.")))
}

async fn quote_match(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Match>>, AppError> {
    Ok(Json(ApiResponse::success(state.matches.by_quote(&principal, id).await?)))
}

async fn quote_counter_offers(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CounterOffer>>>, AppError> {
    Ok(Json(ApiResponse::success(
        state.counter_offers.for_quote(&principal, id).await?,
    )))
}
