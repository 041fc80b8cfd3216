use crate::types::{BrainId, FileId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Brain file lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, utoipa::ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Uploaded and recorded, waiting for the ingestion pipeline
    Pending,
    /// Ingestion pipeline has processed the file
    Ingested,
    /// Removed by the user - metadata retained, bytes no longer count against quota
    Deleted,
}

/// File record row within a brain
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BrainFile {
    pub id: FileId,
    pub brain_id: BrainId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub enable_summarization: bool,
    pub openai_api_key_provided: bool,
    pub status: FileStatus,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Database request for creating a new brain file record
#[derive(Debug, Clone)]
pub struct BrainFileCreateDBRequest {
    pub brain_id: BrainId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub enable_summarization: bool,
    pub openai_api_key_provided: bool,
    pub status: FileStatus,
    pub uploaded_by: UserId,
}

/// Database request for updating a brain file record
#[derive(Debug, Clone)]
pub struct BrainFileUpdateDBRequest {
    pub status: Option<FileStatus>,
}
