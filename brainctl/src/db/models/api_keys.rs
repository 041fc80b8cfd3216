use crate::types::{ApiKeyId, UserId};
use chrono::{DateTime, Utc};

/// API key row.
///
/// The `secret` is the full bearer credential. It is returned exactly once,
/// at creation time; list/read paths must go through DTOs that omit it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub user_id: UserId,
    pub name: String,
    pub secret: String,
    pub created_at: DateTime<Utc>,
}

/// Database request for creating a new API key
#[derive(Debug, Clone)]
pub struct ApiKeyCreateDBRequest {
    pub user_id: UserId,
    pub name: String,
    pub secret: String,
}

impl ApiKeyCreateDBRequest {
    /// Build a create request with a freshly generated `sk-` secret.
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            secret: crate::crypto::generate_api_key(),
        }
    }
}

/// Database request for updating an API key
#[derive(Debug, Clone)]
pub struct ApiKeyUpdateDBRequest {
    pub name: Option<String>,
}
