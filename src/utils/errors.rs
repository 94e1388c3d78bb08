//! Sistema de manejo de errores
//!
//! Este módulo define el error único de la aplicación, su categoría estable
//! y su conversión a respuestas HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::pricing::PricingError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Categoría estable expuesta a los clientes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    BadRequest,
    Conflict,
    NotFound,
    ServiceUnavailable,
    Internal,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not-found",
            ErrorKind::ServiceUnavailable => "service-unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidInput(_) | AppError::Validation(_) => ErrorKind::BadRequest,
            AppError::Unauthorized(_) | AppError::Jwt(_) => ErrorKind::Unauthorized,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            AppError::Database(_) | AppError::Hash(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Código estable para el cuerpo de la respuesta
    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::ServiceUnavailable(_) => "EXTERNAL_API_ERROR",
            AppError::Database(_) => "DB_ERROR",
            AppError::Jwt(_) => "JWT_ERROR",
            AppError::Hash(_) => "HASH_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Mensaje visible; los errores internos no exponen detalles
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::Jwt(msg) => msg.clone(),
            AppError::Validation(e) => e.to_string(),
            AppError::Database(_) => "An error occurred while accessing the database".to_string(),
            AppError::Hash(_) => "An error occurred while processing credentials".to_string(),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(error: PricingError) -> Self {
        AppError::InvalidInput(error.to_string())
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        match kind {
            ErrorKind::Internal => tracing::error!("❌ {}", self),
            ErrorKind::ServiceUnavailable => tracing::warn!("⚠️ {}", self),
            _ => tracing::debug!("{}", self),
        }

        let body = ErrorResponse {
            error: kind.as_str().to_string(),
            message: self.public_message(),
            code: self.code().to_string(),
        };

        (kind.status(), Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(message: impl Into<String>) -> AppError {
    AppError::Conflict(message.into())
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

/// Función helper para crear errores de entrada inválida
pub fn invalid_input_error(message: impl Into<String>) -> AppError {
    AppError::InvalidInput(message.into())
}

/// Función helper para crear errores internos
pub fn internal_error(message: impl Into<String>) -> AppError {
    AppError::Internal(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_map_to_status() {
        assert_eq!(invalid_input_error("x").kind().status(), StatusCode::BAD_REQUEST);
        assert_eq!(forbidden_error("cancel", "no").kind().status(), StatusCode::FORBIDDEN);
        assert_eq!(not_found_error("Match", 1).kind().status(), StatusCode::NOT_FOUND);
        assert_eq!(conflict_error("dup").kind().status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::ServiceUnavailable("down".into()).kind().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(internal_error("boom").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_pricing_errors_are_invalid_input() {
        let error: AppError = PricingError::ConflictingMultipliers.into();
        assert!(matches!(error, AppError::InvalidInput(_)));
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let error = internal_error("connection string leaked");
        assert!(!error.public_message().contains("leaked"));
        assert_eq!(error.code(), "INTERNAL_ERROR");
    }
}
