//! Service layer.
//!
//! One service per area; each is built per request from the shared
//! [`AppState`](crate::AppState) and returns [`ApiResult`](crate::ApiResult).

pub mod auth_service;
pub mod coupon_service;
pub mod health_service;
pub mod report_service;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::Utc;
    use coupon_core::User;
    use coupon_db::password::hash_password;
    use coupon_db::{Database, DbConfig};
    use uuid::Uuid;

    use crate::{ApiConfig, AppState};

    pub const ADMIN_PASSWORD: &str = "admin123";

    /// Default configuration over a fresh in-memory database.
    pub async fn test_state() -> Arc<AppState> {
        let config = ApiConfig::build(ApiConfig::defaults().unwrap()).unwrap();
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Arc::new(AppState::new(config, db))
    }

    /// Inserts an active `admin` user with [`ADMIN_PASSWORD`].
    pub async fn seed_admin(state: &AppState) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: "admin".to_string(),
            password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };
        state.db.users().insert(&user).await.unwrap()
    }
}
