//! DTOs de la API
//!
//! Cuerpos de petición validados con `validator` y el sobre genérico
//! `ApiResponse<T>` de las respuestas.

pub mod announcement_dto;
pub mod api_response;
pub mod auth_dto;
pub mod counter_offer_dto;
pub mod match_dto;
pub mod payment_dto;
pub mod quote_dto;
pub mod surcharge_dto;

pub use api_response::ApiResponse;
