//! Authentication routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use coupon_core::User;

use crate::auth::AuthUser;
use crate::error::{ApiJson, ApiResult};
use crate::services::auth_service::{AuthResponse, AuthService, LoginRequest, RegisterRequest};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        // Older admin panels post here
        .route("/api/auth/users", post(register))
        .route("/api/auth/me", get(me))
}

async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(AuthService::new(state).login(&request).await?))
}

/// Only an existing admin can create another.
async fn register(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    tracing::info!(by = %user.username, new_user = %request.username.trim(), "Registering user");
    Ok(Json(AuthService::new(state).register(&request).await?))
}

async fn me(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<Json<User>> {
    Ok(Json(AuthService::new(state).me(&user.user_id).await?))
}
