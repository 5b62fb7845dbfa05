//! Health check service.
//!
//! Reports whether the server can still reach its database.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::AppState;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" or "degraded"
    pub status: String,
    /// "up" or "down"
    pub database: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }
}

/// Health service implementation.
pub struct HealthService {
    state: Arc<AppState>,
}

impl HealthService {
    /// Create a new health service.
    pub fn new(state: Arc<AppState>) -> Self {
        HealthService { state }
    }

    /// Pings the database.
    pub async fn check(&self) -> HealthResponse {
        if self.state.db.health_check().await {
            HealthResponse {
                status: "ok".to_string(),
                database: "up".to_string(),
            }
        } else {
            tracing::warn!("Health check: database unreachable");
            HealthResponse {
                status: "degraded".to_string(),
                database: "down".to_string(),
            }
        }
    }
}
