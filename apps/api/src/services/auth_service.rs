//! Authentication service.
//!
//! Exchanges admin credentials for session tokens and manages admin
//! accounts.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use coupon_core::validation::{validate_new_password, validate_username};
use coupon_core::{User, ValidationError};
use coupon_db::password::{hash_password, verify_password};
use coupon_db::DbError;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const MSG_BAD_CREDENTIALS: &str = "Invalid username or password";

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/auth/users`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Issued session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Authentication service implementation.
pub struct AuthService {
    state: Arc<AppState>,
}

impl AuthService {
    /// Create a new authentication service.
    pub fn new(state: Arc<AppState>) -> Self {
        AuthService { state }
    }

    /// Verifies credentials and issues a token.
    ///
    /// Unknown user, disabled user and wrong password all produce the same
    /// 401 so the response does not reveal which usernames exist.
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        let username = request.username.trim();
        info!(username = %username, "Login attempt");

        let user = match self.state.db.users().get_by_username(username).await? {
            Some(user) if user.is_active => user,
            Some(_) => {
                warn!(username = %username, "Login rejected: user disabled");
                return Err(ApiError::unauthorized(MSG_BAD_CREDENTIALS));
            }
            None => {
                warn!(username = %username, "Login rejected: unknown user");
                return Err(ApiError::unauthorized(MSG_BAD_CREDENTIALS));
            }
        };

        if !verify_password(&request.password, &user.password_hash) {
            warn!(username = %username, "Login rejected: wrong password");
            return Err(ApiError::unauthorized(MSG_BAD_CREDENTIALS));
        }

        self.state
            .db
            .users()
            .touch_last_login(&user.id, Utc::now())
            .await?;

        info!(user_id = %user.id, "Login successful");
        self.issue(&user)
    }

    /// Creates an admin account and returns a token for it.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        let username = request.username.trim();

        validate_username(username)?;
        validate_new_password(&request.password, &request.confirm_password)?;

        if self.state.db.users().username_exists(username).await? {
            return Err(ValidationError::Duplicate {
                field: "username".to_string(),
                value: username.to_string(),
            }
            .into());
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: hash_password(&request.password)?,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };

        let user = self.state.db.users().insert(&user).await.map_err(|e| match e {
            DbError::UniqueViolation { field, value } => {
                ApiError::from(ValidationError::Duplicate { field, value })
            }
            other => other.into(),
        })?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        self.issue(&user)
    }

    /// Returns the account behind an authenticated request.
    pub async fn me(&self, user_id: &str) -> ApiResult<User> {
        self.state
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User", user_id))
    }

    fn issue(&self, user: &User) -> ApiResult<AuthResponse> {
        let token = self.state.jwt.generate_access_token(&user.id, &user.username)?;

        Ok(AuthResponse {
            token,
            username: user.username.clone(),
            expires_in: self.state.jwt.lifetime_secs(),
        })
    }
}
