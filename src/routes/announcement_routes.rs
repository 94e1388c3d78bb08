use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::announcement_dto::{CreateAnnouncementRequest, UpdateAnnouncementRequest};
use crate::dto::ApiResponse;
use crate::models::{Announcement, Principal};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Lectura pública de avisos publicados
pub fn create_public_announcement_router() -> Router<AppState> {
    Router::new().route("/", get(published_announcements))
}

/// Gestión de avisos (administradores)
pub fn create_admin_announcement_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_announcements).post(create_announcement))
        .route(
            "/:id",
            get(get_announcement)
                .put(update_announcement)
                .delete(delete_announcement),
        )
}

async fn published_announcements(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Announcement>>>, AppError> {
    Ok(Json(ApiResponse::success(state.announcements.list_published().await?)))
}

async fn list_announcements(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<Announcement>>>, AppError> {
    Ok(Json(ApiResponse::success(state.announcements.list_all(&principal).await?)))
}

async fn create_announcement(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateAnnouncementRequest>,
) -> Result<Json<ApiResponse<Announcement>>, AppError> {
    request.validate()?;
    let announcement = state
        .announcements
        .create(
            &principal,
            &request.title,
            &request.content,
            request.is_pinned,
            request.publish,
        )
        .await?;
    Ok(Json(ApiResponse::success(announcement)))
}

async fn get_announcement(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Announcement>>, AppError> {
    Ok(Json(ApiResponse::success(state.announcements.get(&principal, id).await?)))
}

async fn update_announcement(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAnnouncementRequest>,
) -> Result<Json<ApiResponse<Announcement>>, AppError> {
    request.validate()?;
    let announcement = state.announcements.update(&principal, id, request.into()).await?;
    Ok(Json(ApiResponse::success(announcement)))
}

async fn delete_announcement(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.announcements.delete(&principal, id).await?;
    Ok(Json(ApiResponse::message("공지사항이 삭제되었습니다.")))
}
