use crate::{
    AppState,
    api::models::{
        files::{BrainFileResponse, ListBrainFilesQuery},
        users::CurrentUser,
    },
    db::handlers::{BrainFiles, Brains, Repository, files::BrainFileFilter},
    errors::{Error, Result},
    types::BrainId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use sqlx::Acquire;

#[utoipa::path(
    get,
    path = "/brains/{brain_id}/files",
    tag = "files",
    summary = "List brain files",
    description = "Returns the file records of a brain, newest last.",
    params(
        ("brain_id" = uuid::Uuid, Path, description = "The ID of the brain"),
        ListBrainFilesQuery
    ),
    responses(
        (status = 200, description = "List of file records", body = [BrainFileResponse]),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Brain not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_key" = [])
    )
)]
pub async fn list_brain_files(
    State(state): State<AppState>,
    Path(brain_id): Path<BrainId>,
    Query(query): Query<ListBrainFilesQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<BrainFileResponse>>> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let brain = {
        let mut repo = Brains::new(pool_conn.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.get_by_id(brain_id).await?.ok_or_else(|| Error::NotFound {
            resource: "Brain".to_string(),
            id: brain_id.to_string(),
        })?
    };

    // Other users' brains are indistinguishable from missing ones
    if brain.created_by != current_user.id {
        return Err(Error::NotFound {
            resource: "Brain".to_string(),
            id: brain_id.to_string(),
        });
    }

    let mut repo = BrainFiles::new(pool_conn.acquire().await.map_err(|e| Error::Database(e.into()))?);
    let files = repo.list(&BrainFileFilter::new(skip, limit).brain_id(brain.id)).await?;

    Ok(Json(files.into_iter().map(BrainFileResponse::from).collect()))
}
