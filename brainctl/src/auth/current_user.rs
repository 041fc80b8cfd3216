use crate::{
    AppState,
    api::models::users::CurrentUser,
    db::{errors::DbError, handlers::ApiKeys},
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use tracing::{debug, instrument, trace};

/// Extract user from API key in Authorization header if present and valid
/// Returns:
/// - None: No Authorization header or not a Bearer token
/// - Some(Ok(user)): Valid API key found and user authenticated
/// - Some(Err(error)): Bearer token present but invalid
#[instrument(skip(parts, db))]
async fn try_api_key_auth(parts: &Parts, db: &PgPool) -> Option<Result<CurrentUser>> {
    let auth_header = match parts.headers.get(axum::http::header::AUTHORIZATION) {
        Some(header) => header,
        None => return None,
    };

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    let api_key = match auth_str.strip_prefix("Bearer ") {
        Some(key) => key,
        None => return None, // Not a Bearer token
    };

    let mut conn = match db.acquire().await {
        Ok(conn) => conn,
        Err(e) => return Some(Err(DbError::from(e).into())),
    };

    let mut api_keys = ApiKeys::new(&mut conn);
    let user = match api_keys.find_user_by_secret(api_key).await {
        Ok(user) => user,
        Err(e) => return Some(Err(Error::Database(e))),
    };

    match user {
        Some(user) => Some(Ok(CurrentUser {
            id: user.id,
            username: user.username,
            email: user.email,
        })),
        None => Some(Err(Error::Unauthenticated {
            message: Some("Invalid API key".to_string()),
        })),
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_api_key_auth(parts, &state.db).await {
            Some(Ok(user)) => {
                debug!("Found API key authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("API key authentication failed: {:?}", e);
                Err(Error::Unauthenticated { message: None })
            }
            None => {
                trace!("No authentication credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::users::CurrentUser,
        db::{handlers::Repository as _, models::api_keys::ApiKeyCreateDBRequest},
        test_utils::{create_test_config, create_test_user},
    };
    use axum::{extract::FromRequestParts as _, http::request::Parts};
    use sqlx::PgPool;

    fn create_test_parts_with_header(header_name: &str, header_value: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(header_name, header_value)
            .body(())
            .unwrap();

        let (parts, _body) = request.into_parts();
        parts
    }

    #[sqlx::test]
    async fn test_valid_bearer_key_resolves_user(pool: PgPool) {
        let state = crate::AppState::builder().db(pool.clone()).config(create_test_config()).build();

        let user = create_test_user(&pool).await;
        let key = {
            let mut conn = pool.acquire().await.unwrap();
            let mut repo = crate::db::handlers::ApiKeys::new(&mut conn);
            repo.create(&ApiKeyCreateDBRequest::new(user.id, "test")).await.unwrap()
        };

        let mut parts = create_test_parts_with_header("authorization", &format!("Bearer {}", key.secret));
        let result = CurrentUser::from_request_parts(&mut parts, &state).await;

        let current_user = result.expect("valid key should authenticate");
        assert_eq!(current_user.id, user.id);
        assert_eq!(current_user.email, user.email);
    }

    #[sqlx::test]
    async fn test_unknown_key_is_unauthorized(pool: PgPool) {
        let state = crate::AppState::builder().db(pool.clone()).config(create_test_config()).build();

        let mut parts = create_test_parts_with_header("authorization", "Bearer sk-unknown");
        let result = CurrentUser::from_request_parts(&mut parts, &state).await;

        let error = result.unwrap_err();
        assert_eq!(error.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_missing_header_is_unauthorized(pool: PgPool) {
        let state = crate::AppState::builder().db(pool.clone()).config(create_test_config()).build();

        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let result = CurrentUser::from_request_parts(&mut parts, &state).await;

        let error = result.unwrap_err();
        assert_eq!(error.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_non_bearer_scheme_is_unauthorized(pool: PgPool) {
        let state = crate::AppState::builder().db(pool.clone()).config(create_test_config()).build();

        let mut parts = create_test_parts_with_header("authorization", "Basic dXNlcjpwYXNz");
        let result = CurrentUser::from_request_parts(&mut parts, &state).await;

        assert!(result.is_err());
    }
}
