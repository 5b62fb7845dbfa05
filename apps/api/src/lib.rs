//! # Coupon API
//!
//! REST server for coupon validation, redemption and administration.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Coupon API Services                             │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │ CouponService  │  │  AuthService   │  │  ReportService             ││
//! │  │                │  │                │  │                            ││
//! │  │ • validate     │  │ • login        │  │ • users                    ││
//! │  │ • validate_all │  │ • register     │  │ • coupons by user / date   ││
//! │  │ • can_combine  │  │ • me           │  │ • filtered rows            ││
//! │  │ • redeem, CRUD │  │                │  │ • statistics               ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │          │                   │                        │                 │
//! │          ▼                   ▼                        ▼                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  coupon-core (pure rules)        coupon-db (SQLite repositories) │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `COUPON_HTTP_PORT` - HTTP port (default: 5000)
//! - `COUPON_BIND_ADDR` - Interface to bind (default: 0.0.0.0)
//! - `COUPON_DATABASE_PATH` - SQLite file (default: ./coupons.db)
//! - `COUPON_JWT_SECRET` - Secret for token signing
//! - `COUPON_JWT_LIFETIME_SECS` - Token lifetime (default: 604800)
//! - `COUPON_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `COUPON_CORS_ORIGIN` - Admin panel origin (default: http://localhost:3000)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;

// Re-exports
pub use auth::{AuthUser, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::build_router;

use coupon_db::Database;

/// Shared application state.
pub struct AppState {
    pub config: ApiConfig,
    pub db: Database,
    pub jwt: JwtManager,
}

impl AppState {
    /// Wires the token manager from `config`.
    pub fn new(config: ApiConfig, db: Database) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
        AppState { config, db, jwt }
    }
}
