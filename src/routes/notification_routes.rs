use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::dto::ApiResponse;
use crate::models::{Notification, Principal};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_notification_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/:id/read", post(mark_read))
}

async fn list_notifications(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, AppError> {
    Ok(Json(ApiResponse::success(state.notifications.list_mine(&principal).await?)))
}

async fn unread_count(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let count = state.notifications.unread_count(&principal).await?;
    Ok(Json(ApiResponse::success(json!({ "unread": count }))))
}

async fn mark_read(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.notifications.mark_read(&principal, id).await?;
    Ok(Json(ApiResponse::message("알림을 읽음 처리했습니다.")))
}
