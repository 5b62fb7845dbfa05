//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Public                                                                 │
//! │    GET  /health                                                         │
//! │    POST /api/coupons/validate | validate-multiple | can-combine         │
//! │    POST /api/auth/login                                                 │
//! │                                                                         │
//! │  Bearer token required                                                  │
//! │    POST /api/coupons/redeem                                             │
//! │    GET/POST /api/coupons, GET/PUT/DELETE /api/coupons/{id}              │
//! │    POST /api/auth/register (alias /api/auth/users), GET /api/auth/me    │
//! │    GET  /api/reports/...                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod coupons;
mod health;
mod reports;

use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Builds the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(coupons::router())
        .merge(auth::router())
        .merge(reports::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origin))
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = %origin, "Ignoring unparsable CORS origin");
            layer
        }
    }
}

// =============================================================================
// Router Tests
// =============================================================================
