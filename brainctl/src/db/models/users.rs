use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub email: String,
}

/// Database request for updating a user
#[derive(Debug, Clone)]
pub struct UserUpdateDBRequest {
    pub username: Option<String>,
}
