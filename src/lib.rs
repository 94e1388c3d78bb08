//! Freight Market
//!
//! Mercado de transporte de mercancías: presupuestos con precio calculado,
//! matches entre remitentes y conductores, contraofertas, notificaciones y
//! liquidación de pagos.

pub mod clients;
pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod pricing;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_layer;
use crate::state::AppState;

/// Aplicación completa: rutas, trazas HTTP y CORS
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    routes::create_api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
