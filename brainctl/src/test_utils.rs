//! Test utilities for integration testing.

use crate::config::{Config, QuotaConfig};
use crate::db::{
    handlers::{ApiKeys, Brains, Repository, Users},
    models::{
        api_keys::{ApiKey, ApiKeyCreateDBRequest},
        brains::{Brain, BrainCreateDBRequest},
        users::{User, UserCreateDBRequest},
    },
};
use crate::types::UserId;
use axum_test::TestServer;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_email: "admin@test.com".to_string(),
        quotas: QuotaConfig {
            default_max_brain_size: 1024 * 1024, // 1 MiB
            max_brain_size_with_key: 10 * 1024 * 1024,
        },
        enable_metrics: false,
        enable_otel_export: false,
        ..Default::default()
    }
}

pub async fn create_test_user(pool: &PgPool) -> User {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let user_id = Uuid::new_v4();
    let username = format!("testuser_{}", user_id.simple());
    let email = format!("{username}@example.com");

    users_repo
        .create(&UserCreateDBRequest { username, email })
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_api_key_for_user(pool: &PgPool, user_id: UserId) -> ApiKey {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut api_key_repo = ApiKeys::new(&mut conn);

    api_key_repo
        .create(&ApiKeyCreateDBRequest::new(user_id, "Test API Key"))
        .await
        .expect("Failed to create test API key")
}

/// Create a user together with an API key for authenticating as them.
pub async fn create_test_user_with_key(pool: &PgPool) -> (User, ApiKey) {
    let user = create_test_user(pool).await;
    let key = create_test_api_key_for_user(pool, user.id).await;
    (user, key)
}

pub async fn create_test_brain(pool: &PgPool, created_by: UserId, max_size_bytes: i64) -> Brain {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut brain_repo = Brains::new(&mut conn);

    brain_repo
        .create(&BrainCreateDBRequest {
            name: format!("test_brain_{}", Uuid::new_v4().simple()),
            max_size_bytes,
            created_by,
        })
        .await
        .expect("Failed to create test brain")
}

/// `Authorization` header value for a test API key.
pub fn bearer(key: &ApiKey) -> String {
    format!("Bearer {}", key.secret)
}
