use axum::{extract::State, routing::post, Json, Router};
use validator::Validate;

use crate::dto::auth_dto::{DriverSignupRequest, LoginRequest, ShipperSignupRequest};
use crate::dto::ApiResponse;
use crate::services::{AccountView, AuthSession};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Configura las rutas de autenticación
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup/shipper", post(signup_shipper))
        .route("/signup/driver", post(signup_driver))
        .route("/login", post(login))
}

async fn signup_shipper(
    State(state): State<AppState>,
    Json(request): Json<ShipperSignupRequest>,
) -> Result<Json<ApiResponse<AccountView>>, AppError> {
    request.validate()?;
    let account = state.accounts.signup_shipper(request.into()).await?;
    Ok(Json(ApiResponse::success_with_message(account, "회원가입이 완료되었습니다.")))
}

async fn signup_driver(
    State(state): State<AppState>,
    Json(request): Json<DriverSignupRequest>,
) -> Result<Json<ApiResponse<AccountView>>, AppError> {
    request.validate()?;
    let account = state.accounts.signup_driver(request.into_signup()?).await?;
    Ok(Json(ApiResponse::success_with_message(account, "회원가입이 완료되었습니다.")))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, AppError> {
    request.validate()?;
    let session = state.accounts.login(&request.email, &request.password).await?;
    Ok(Json(ApiResponse::success(session)))
}
