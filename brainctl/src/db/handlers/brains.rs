use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::brains::{Brain, BrainCreateDBRequest, BrainUpdateDBRequest},
};
use crate::types::{BrainId, UserId};
use sqlx::PgConnection;
use std::collections::HashMap;

/// Filter for listing brains
#[derive(Debug, Clone)]
pub struct BrainFilter {
    pub created_by: Option<UserId>,
    pub skip: i64,
    pub limit: i64,
}

impl BrainFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            created_by: None,
            skip,
            limit,
        }
    }

    pub fn created_by(mut self, user_id: UserId) -> Self {
        self.created_by = Some(user_id);
        self
    }
}

pub struct Brains<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Brains<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Brains<'c> {
    type CreateRequest = BrainCreateDBRequest;
    type UpdateRequest = BrainUpdateDBRequest;
    type Response = Brain;
    type Id = BrainId;
    type Filter = BrainFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let brain = sqlx::query_as::<_, Brain>(
            r#"
            INSERT INTO brains (name, max_size_bytes, created_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(request.max_size_bytes)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(brain)
    }

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let brain = sqlx::query_as::<_, Brain>("SELECT * FROM brains WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(brain)
    }

    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let brains = sqlx::query_as::<_, Brain>("SELECT * FROM brains WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(brains.into_iter().map(|b| (b.id, b)).collect())
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = sqlx::QueryBuilder::new("SELECT * FROM brains WHERE 1=1");

        if let Some(user_id) = filter.created_by {
            query.push(" AND created_by = ");
            query.push_bind(user_id);
        }

        query.push(" ORDER BY created_at ASC OFFSET ");
        query.push_bind(filter.skip);
        query.push(" LIMIT ");
        query.push_bind(filter.limit);

        let brains = query.build_query_as::<Brain>().fetch_all(&mut *self.db).await?;

        Ok(brains)
    }

    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM brains WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let brain = sqlx::query_as::<_, Brain>(
            r#"
            UPDATE brains
            SET
                name = COALESCE($2, name),
                max_size_bytes = COALESCE($3, max_size_bytes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.max_size_bytes)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(brain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{handlers::Users, models::users::UserCreateDBRequest};
    use sqlx::PgPool;

    async fn create_test_user(pool: &PgPool) -> UserId {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        users
            .create(&UserCreateDBRequest {
                username: "brainuser".to_string(),
                email: "brainuser@example.com".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[sqlx::test]
    async fn test_create_get_update(pool: PgPool) {
        let user_id = create_test_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Brains::new(&mut conn);

        let brain = repo
            .create(&BrainCreateDBRequest {
                name: "research".to_string(),
                max_size_bytes: 1024,
                created_by: user_id,
            })
            .await
            .unwrap();

        let fetched = repo.get_by_id(brain.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "research");
        assert_eq!(fetched.max_size_bytes, 1024);

        let updated = repo
            .update(
                brain.id,
                &BrainUpdateDBRequest {
                    name: None,
                    max_size_bytes: Some(4096),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "research");
        assert_eq!(updated.max_size_bytes, 4096);
    }

    #[sqlx::test]
    async fn test_list_scoped_to_creator(pool: PgPool) {
        let user_id = create_test_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Brains::new(&mut conn);

        for name in ["one", "two"] {
            repo.create(&BrainCreateDBRequest {
                name: name.to_string(),
                max_size_bytes: 1024,
                created_by: user_id,
            })
            .await
            .unwrap();
        }

        let mine = repo.list(&BrainFilter::new(0, 100).created_by(user_id)).await.unwrap();
        assert_eq!(mine.len(), 2);

        let theirs = repo
            .list(&BrainFilter::new(0, 100).created_by(uuid::Uuid::new_v4()))
            .await
            .unwrap();
        assert!(theirs.is_empty());
    }
}
