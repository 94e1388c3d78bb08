use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::payment_dto::{ConfirmPaymentRequest, CreatePaymentRequest, PreparePaymentRequest};
use crate::dto::ApiResponse;
use crate::models::{Payment, Principal};
use crate::services::PreparedPayment;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_payment_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_payment))
        .route("/prepare", post(prepare_payment))
        .route("/confirm", post(confirm_payment))
        .route("/mine", get(my_payments))
        .route("/:id", get(get_payment))
}

async fn create_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    request.validate()?;
    let (match_id, payment) = request.into_parts();
    let payment = state.payments.create(&principal, match_id, payment).await?;
    Ok(Json(ApiResponse::success(payment)))
}

async fn prepare_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<PreparePaymentRequest>,
) -> Result<Json<ApiResponse<PreparedPayment>>, AppError> {
    request.validate()?;
    let prepared = state
        .payments
        .prepare(&principal, request.match_id, request.amount, request.order_name)
        .await?;
    Ok(Json(ApiResponse::success(prepared)))
}

async fn confirm_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    request.validate()?;
    let payment = state
        .payments
        .confirm(&principal, &request.payment_key, &request.order_id, request.amount)
        .await?;
    Ok(Json(ApiResponse::success_with_message(payment, "결제가 완료되었습니다.")))
}

async fn my_payments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, AppError> {
    Ok(Json(ApiResponse::success(state.payments.mine(&principal).await?)))
}

async fn get_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    Ok(Json(ApiResponse::success(state.payments.get(&principal, id).await?)))
}
