use crate::db::models::brains::Brain;
use crate::types::{BrainId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Request body for creating a brain
#[derive(Debug, Deserialize, ToSchema)]
pub struct BrainCreate {
    pub name: String,
    /// Capacity ceiling in bytes; defaults to the configured
    /// `quotas.default_max_brain_size` when omitted
    pub max_size_bytes: Option<i64>,
}

/// Query parameters for listing brains
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBrainsQuery {
    /// Number of brains to skip
    pub skip: Option<i64>,

    /// Maximum number of brains to return (1-1000, default 100)
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,
}

/// Brain object response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BrainResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: BrainId,
    pub name: String,
    pub max_size_bytes: i64,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Brain> for BrainResponse {
    fn from(brain: Brain) -> Self {
        Self {
            id: brain.id,
            name: brain.name,
            max_size_bytes: brain.max_size_bytes,
            created_by: brain.created_by,
            created_at: brain.created_at,
        }
    }
}

/// Brain detail response including storage usage
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BrainUsageResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: BrainId,
    pub name: String,
    pub max_size_bytes: i64,
    pub used_bytes: i64,
    pub remaining_bytes: i64,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl BrainUsageResponse {
    pub fn from_brain(brain: &Brain, used_bytes: i64) -> Self {
        Self {
            id: brain.id,
            name: brain.name.clone(),
            max_size_bytes: brain.max_size_bytes,
            used_bytes,
            remaining_bytes: brain.max_size_bytes - used_bytes,
            created_by: brain.created_by,
            created_at: brain.created_at,
        }
    }
}
