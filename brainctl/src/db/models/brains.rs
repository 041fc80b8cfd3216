use crate::types::{BrainId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Brain row: a per-workspace knowledge store with a byte-capacity ceiling.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Brain {
    pub id: BrainId,
    pub name: String,
    pub max_size_bytes: i64,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database request for creating a new brain
#[derive(Debug, Clone)]
pub struct BrainCreateDBRequest {
    pub name: String,
    pub max_size_bytes: i64,
    pub created_by: UserId,
}

/// Database request for updating a brain
#[derive(Debug, Clone)]
pub struct BrainUpdateDBRequest {
    pub name: Option<String>,
    pub max_size_bytes: Option<i64>,
}
