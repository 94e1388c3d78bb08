//! Rutas HTTP
//!
//! Routers finos por recurso. Todo lo que no está bajo `/api/auth`, la
//! lectura de avisos, el catálogo de checklist o `/health` pasa por
//! `auth_middleware`.

pub mod announcement_routes;
pub mod auth_routes;
pub mod catalog_routes;
pub mod counter_offer_routes;
pub mod match_routes;
pub mod notification_routes;
pub mod payment_routes;
pub mod quote_routes;

use axum::{middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Router de la API con el estado ya aplicado
pub fn create_api_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/quotes", quote_routes::create_quote_router())
        .nest("/matches", match_routes::create_match_router())
        .nest("/counter-offers", counter_offer_routes::create_counter_offer_router())
        .nest("/notifications", notification_routes::create_notification_router())
        .nest("/payments", payment_routes::create_payment_router())
        .nest(
            "/admin/announcements",
            announcement_routes::create_admin_announcement_router(),
        )
        .nest("/admin/surcharge-options", catalog_routes::create_surcharge_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let public = Router::new()
        .nest("/auth", auth_routes::create_auth_router())
        .nest(
            "/announcements",
            announcement_routes::create_public_announcement_router(),
        )
        .nest("/checklist-items", catalog_routes::create_checklist_router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", public.merge(protected))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "freight_market",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
