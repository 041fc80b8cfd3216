use crate::{
    AppState,
    api::models::{
        brains::{BrainCreate, BrainResponse, BrainUsageResponse, ListBrainsQuery},
        users::CurrentUser,
    },
    db::handlers::{BrainFiles, Brains, Repository, brains::BrainFilter},
    db::models::brains::BrainCreateDBRequest,
    errors::{Error, Result},
    types::BrainId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use sqlx::Acquire;

#[utoipa::path(
    post,
    path = "/brains",
    tag = "brains",
    summary = "Create brain",
    description = "Create a knowledge store with a byte-capacity ceiling. The ceiling defaults \
                   to the configured `quotas.default_max_brain_size` when omitted.",
    request_body = BrainCreate,
    responses(
        (status = 201, description = "Brain created successfully", body = BrainResponse),
        (status = 400, description = "Invalid brain data"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_key" = [])
    )
)]
pub async fn create_brain(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<BrainCreate>,
) -> Result<(StatusCode, Json<BrainResponse>)> {
    if data.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Brain name cannot be empty".to_string(),
        });
    }

    let max_size_bytes = data.max_size_bytes.unwrap_or(state.config.quotas.default_max_brain_size);
    if max_size_bytes <= 0 {
        return Err(Error::BadRequest {
            message: "max_size_bytes must be positive".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Brains::new(&mut pool_conn);

    let brain = repo
        .create(&BrainCreateDBRequest {
            name: data.name,
            max_size_bytes,
            created_by: current_user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(BrainResponse::from(brain))))
}

#[utoipa::path(
    get,
    path = "/brains",
    tag = "brains",
    summary = "List brains",
    description = "List brains created by the current user.",
    params(ListBrainsQuery),
    responses(
        (status = 200, description = "List of brains", body = [BrainResponse]),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_key" = [])
    )
)]
pub async fn list_brains(
    State(state): State<AppState>,
    Query(query): Query<ListBrainsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<BrainResponse>>> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Brains::new(&mut pool_conn);

    let brains = repo.list(&BrainFilter::new(skip, limit).created_by(current_user.id)).await?;

    Ok(Json(brains.into_iter().map(BrainResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/brains/{brain_id}",
    tag = "brains",
    summary = "Get brain",
    description = "Returns a brain with its storage usage: capacity ceiling, consumed bytes, \
                   and remaining free space.",
    params(
        ("brain_id" = uuid::Uuid, Path, description = "The ID of the brain to retrieve")
    ),
    responses(
        (status = 200, description = "Brain detail with usage", body = BrainUsageResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Brain not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_key" = [])
    )
)]
pub async fn get_brain(
    State(state): State<AppState>,
    Path(brain_id): Path<BrainId>,
    current_user: CurrentUser,
) -> Result<Json<BrainUsageResponse>> {
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

    let used_bytes = {
        let mut repo = BrainFiles::new(pool_conn.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.used_bytes(brain.id).await?
    };

    Ok(Json(BrainUsageResponse::from_brain(&brain, used_bytes)))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::brains::{BrainResponse, BrainUsageResponse},
        test_utils::*,
    };
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_brain_with_default_ceiling(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let (_user, key) = create_test_user_with_key(&pool).await;

        let response = app
            .post("/brains")
            .add_header("authorization", bearer(&key))
            .json(&json!({ "name": "research" }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let brain: BrainResponse = response.json();
        assert_eq!(brain.name, "research");
        // Default ceiling comes from the test config
        assert_eq!(brain.max_size_bytes, create_test_config().quotas.default_max_brain_size);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_brain_rejects_empty_name(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let (_user, key) = create_test_user_with_key(&pool).await;

        let response = app
            .post("/brains")
            .add_header("authorization", bearer(&key))
            .json(&json!({ "name": "   " }))
            .await;

        response.assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_brains_is_creator_scoped(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let (user_a, key_a) = create_test_user_with_key(&pool).await;
        let (_user_b, key_b) = create_test_user_with_key(&pool).await;

        create_test_brain(&pool, user_a.id, 1024).await;
        create_test_brain(&pool, user_a.id, 2048).await;

        let response = app.get("/brains").add_header("authorization", bearer(&key_a)).await;
        response.assert_status_ok();
        let brains: Vec<BrainResponse> = response.json();
        assert_eq!(brains.len(), 2);

        let response = app.get("/brains").add_header("authorization", bearer(&key_b)).await;
        response.assert_status_ok();
        let brains: Vec<BrainResponse> = response.json();
        assert!(brains.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_brain_reports_usage(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let (user, key) = create_test_user_with_key(&pool).await;
        let brain = create_test_brain(&pool, user.id, 1000).await;

        let form = MultipartForm::new().add_part("file", Part::bytes(&b"0123456789"[..]).file_name("ten.txt"));
        app.post(&format!("/upload?brain_id={}", brain.id))
            .add_header("authorization", bearer(&key))
            .multipart(form)
            .await
            .assert_status_ok();

        let response = app
            .get(&format!("/brains/{}", brain.id))
            .add_header("authorization", bearer(&key))
            .await;

        response.assert_status_ok();
        let usage: BrainUsageResponse = response.json();
        assert_eq!(usage.max_size_bytes, 1000);
        assert_eq!(usage.used_bytes, 10);
        assert_eq!(usage.remaining_bytes, 990);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_foreign_brain_is_not_found(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let (owner, _owner_key) = create_test_user_with_key(&pool).await;
        let (_other, other_key) = create_test_user_with_key(&pool).await;
        let brain = create_test_brain(&pool, owner.id, 1000).await;

        let response = app
            .get(&format!("/brains/{}", brain.id))
            .add_header("authorization", bearer(&other_key))
            .await;

        response.assert_status_not_found();
    }
}
