use crate::{
    AppState,
    api::models::{files::UploadQuery, messages::IngestMessage, users::CurrentUser},
    db::handlers::{BrainFiles, Brains, Repository},
    errors::{Error, Result},
    processors::{self, UploadedFile},
    quota::{BrainQuota, convert_bytes},
};
use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::HeaderMap,
};
use bytes::BytesMut;
use sqlx::Acquire;
use tracing::{debug, warn};

/// Request header carrying a caller-supplied model API key. Its presence
/// switches the quota ceiling to the configured `max_brain_size_with_key`.
pub const OPENAI_API_KEY_HEADER: &str = "openai-api-key";

#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    summary = "Upload file",
    description = "Upload a file into a brain. The upload is validated against the brain's \
                   remaining storage quota before being handed to the ingestion pipeline. \
                   Quota rejections are returned as a `type: error` message with HTTP 200.",
    params(
        UploadQuery,
        ("Openai-Api-Key" = Option<String>, Header, description = "Caller-supplied model API key; raises the quota ceiling to the configured with-key value"),
    ),
    request_body(
        content_type = "multipart/form-data",
        description = "File upload in a `file` field"
    ),
    responses(
        (status = 200, description = "Ingestion outcome message", body = IngestMessage),
        (status = 400, description = "Malformed multipart payload"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Brain not found"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_key" = [])
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    current_user: CurrentUser,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<IngestMessage>> {
    let openai_api_key = headers
        .get(OPENAI_API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    // Collect the file part; other fields are ignored (forward compatibility)
    let mut uploaded: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {}", e),
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            // `uploadFile` kept as an alias for older clients
            "file" | "uploadFile" => {
                let filename = field.file_name().map(|s| s.to_string()).unwrap_or_else(|| "upload".to_string());
                let declared_content_type = field.content_type().map(|s| s.to_string());

                let mut content = BytesMut::new();
                let mut chunk_stream = field;
                while let Some(chunk) = chunk_stream.chunk().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read file chunk: {}", e),
                })? {
                    content.extend_from_slice(&chunk);
                }

                uploaded = Some(UploadedFile::new(filename, declared_content_type, content.freeze()));
            }
            _ => {}
        }
    }

    let file = uploaded.ok_or_else(|| Error::BadRequest {
        message: "Missing required field: 'file'".to_string(),
    })?;
    let file_size = file.size_bytes();

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    // TODO: reject uploads from users who cannot edit this brain once brain
    // sharing roles land; today any authenticated caller can upload into any
    // brain they know the id of
    let brain = {
        let mut repo = Brains::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.get_by_id(query.brain_id).await?.ok_or_else(|| Error::NotFound {
            resource: "Brain".to_string(),
            id: query.brain_id.to_string(),
        })?
    };

    let used_bytes = {
        let mut repo = BrainFiles::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.used_bytes(brain.id).await?
    };

    let mut quota = BrainQuota::new(brain.max_size_bytes, used_bytes);
    if openai_api_key.is_some() {
        quota = quota.with_ceiling(state.config.quotas.max_brain_size_with_key);
    }

    debug!(
        brain_id = %brain.id,
        max_size_bytes = quota.max_size_bytes,
        used_bytes = quota.used_bytes,
        file_size,
        "Checking brain quota"
    );

    if !quota.admits(file_size) {
        warn!(
            brain_id = %brain.id,
            remaining_bytes = quota.remaining_bytes(),
            file_size,
            "Upload rejected: brain quota exceeded"
        );
        // Nothing was written; the transaction rolls back on drop
        return Ok(Json(IngestMessage::error(format!(
            "❌ User's brain will exceed maximum capacity with this upload. Maximum file allowed is : {}",
            convert_bytes(quota.remaining_bytes())
        ))));
    }

    let message = processors::filter_file(
        tx.acquire().await.map_err(|e| Error::Database(e.into()))?,
        &file,
        query.enable_summarization,
        brain.id,
        openai_api_key.as_deref(),
        current_user.id,
    )
    .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(message))
}
