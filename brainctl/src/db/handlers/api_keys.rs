use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::{
        api_keys::{ApiKey, ApiKeyCreateDBRequest, ApiKeyUpdateDBRequest},
        users::User,
    },
};
use crate::types::{ApiKeyId, UserId};
use sqlx::PgConnection;
use std::collections::HashMap;

/// Filter for listing API keys
#[derive(Debug, Clone)]
pub struct ApiKeyFilter {
    pub user_id: Option<UserId>,
    pub skip: i64,
    pub limit: i64,
}

impl ApiKeyFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            user_id: None,
            skip,
            limit,
        }
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

pub struct ApiKeys<'c> {
    db: &'c mut PgConnection,
}

impl<'c> ApiKeys<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Resolve a bearer secret to its owning user. Returns None for unknown
    /// secrets; callers decide how to reject.
    pub async fn find_user_by_secret(&mut self, secret: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.created_at
            FROM api_keys ak
            INNER JOIN users u ON ak.user_id = u.id
            WHERE ak.secret = $1
            "#,
        )
        .bind(secret)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(user)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for ApiKeys<'c> {
    type CreateRequest = ApiKeyCreateDBRequest;
    type UpdateRequest = ApiKeyUpdateDBRequest;
    type Response = ApiKey;
    type Id = ApiKeyId;
    type Filter = ApiKeyFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (user_id, name, secret)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.name)
        .bind(&request.secret)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(api_key)
    }

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let api_key = sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(api_key)
    }

    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let api_keys = sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(api_keys.into_iter().map(|k| (k.id, k)).collect())
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = sqlx::QueryBuilder::new("SELECT * FROM api_keys WHERE 1=1");

        if let Some(user_id) = filter.user_id {
            query.push(" AND user_id = ");
            query.push_bind(user_id);
        }

        query.push(" ORDER BY created_at ASC OFFSET ");
        query.push_bind(filter.skip);
        query.push(" LIMIT ");
        query.push_bind(filter.limit);

        let api_keys = query.build_query_as::<ApiKey>().fetch_all(&mut *self.db).await?;

        Ok(api_keys)
    }

    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            UPDATE api_keys
            SET name = COALESCE($2, name)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{handlers::Users, models::users::UserCreateDBRequest};
    use sqlx::PgPool;

    async fn create_test_user(pool: &PgPool) -> User {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        users
            .create(&UserCreateDBRequest {
                username: "keyuser".to_string(),
                email: "keyuser@example.com".to_string(),
            })
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn test_secret_resolves_to_user(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = ApiKeys::new(&mut conn);

        let request = ApiKeyCreateDBRequest::new(user.id, "Test key");
        let created = repo.create(&request).await.unwrap();
        assert!(created.secret.starts_with("sk-"));

        let resolved = repo.find_user_by_secret(&created.secret).await.unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(user.id));

        let unknown = repo.find_user_by_secret("sk-does-not-exist").await.unwrap();
        assert!(unknown.is_none());
    }

    #[sqlx::test]
    async fn test_list_scoped_to_user(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = ApiKeys::new(&mut conn);

        repo.create(&ApiKeyCreateDBRequest::new(user.id, "first")).await.unwrap();
        repo.create(&ApiKeyCreateDBRequest::new(user.id, "second")).await.unwrap();

        let keys = repo.list(&ApiKeyFilter::new(0, 100).user_id(user.id)).await.unwrap();
        assert_eq!(keys.len(), 2);

        let none = repo
            .list(&ApiKeyFilter::new(0, 100).user_id(uuid::Uuid::new_v4()))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
