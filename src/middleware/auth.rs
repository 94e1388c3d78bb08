//! Middleware de autenticación JWT
//!
//! Este módulo extrae el token Bearer, lo valida con `JwtService` e inyecta
//! el `Principal` en las extensions de la request.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::models::Principal;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let principal: Principal = state.jwt.principal(token)?;
    tracing::debug!("🔐 {} autenticado como {}", principal.user_id, principal.role);

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
