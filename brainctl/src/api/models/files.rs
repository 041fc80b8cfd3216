use crate::db::models::files::{BrainFile, FileStatus};
use crate::types::{BrainId, FileId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing the files in a brain
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBrainFilesQuery {
    /// Number of files to skip
    pub skip: Option<i64>,

    /// Maximum number of files to return (1-1000, default 100)
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,
}

/// File record response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BrainFileResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: FileId,
    #[schema(value_type = String, format = "uuid")]
    pub brain_id: BrainId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub status: FileStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<BrainFile> for BrainFileResponse {
    fn from(file: BrainFile) -> Self {
        Self {
            id: file.id,
            brain_id: file.brain_id,
            filename: file.filename,
            content_type: file.content_type,
            size_bytes: file.size_bytes,
            sha256: file.sha256,
            status: file.status,
            created_at: file.created_at,
        }
    }
}

/// Query parameters for the upload endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// The ID of the brain to upload into
    #[param(value_type = String, format = "uuid")]
    pub brain_id: BrainId,

    /// Whether the ingestion pipeline should summarize the file's content
    #[serde(default)]
    pub enable_summarization: bool,
}
