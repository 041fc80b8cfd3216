use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::users::{User, UserCreateDBRequest, UserUpdateDBRequest},
};
use crate::types::UserId;
use sqlx::PgConnection;
use std::collections::HashMap;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = User;
    type Id = UserId;
    type Filter = UserFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&request.username)
        .bind(&request.email)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            ORDER BY created_at ASC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users)
    }

    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.username)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_create_and_lookup_by_email(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo
            .create(&UserCreateDBRequest {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
            })
            .await
            .unwrap();

        let found = repo.get_user_by_email("alice@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));

        let missing = repo.get_user_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[sqlx::test]
    async fn test_duplicate_email_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let request = UserCreateDBRequest {
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
        };
        repo.create(&request).await.unwrap();

        let err = repo.create(&request).await.unwrap_err();
        assert!(matches!(err, crate::db::errors::DbError::UniqueViolation { .. }));
    }
}
