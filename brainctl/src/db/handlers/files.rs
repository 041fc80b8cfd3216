use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::files::{BrainFile, BrainFileCreateDBRequest, BrainFileUpdateDBRequest, FileStatus},
};
use crate::types::{BrainId, FileId, UserId};
use sqlx::PgConnection;
use std::collections::HashMap;

/// Filter for listing brain files
#[derive(Debug, Clone)]
pub struct BrainFileFilter {
    pub brain_id: Option<BrainId>,
    pub uploaded_by: Option<UserId>,
    pub status: Option<FileStatus>,
    pub skip: i64,
    pub limit: i64,
}

impl BrainFileFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            brain_id: None,
            uploaded_by: None,
            status: None,
            skip,
            limit,
        }
    }

    pub fn brain_id(mut self, brain_id: BrainId) -> Self {
        self.brain_id = Some(brain_id);
        self
    }

    pub fn uploaded_by(mut self, user_id: UserId) -> Self {
        self.uploaded_by = Some(user_id);
        self
    }

    pub fn status(mut self, status: FileStatus) -> Self {
        self.status = Some(status);
        self
    }
}

pub struct BrainFiles<'c> {
    db: &'c mut PgConnection,
}

impl<'c> BrainFiles<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Bytes consumed by a brain's non-deleted files. This is the `used`
    /// side of the quota check.
    pub async fn used_bytes(&mut self, brain_id: BrainId) -> Result<i64> {
        let used = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(size_bytes), 0)::BIGINT
            FROM brain_files
            WHERE brain_id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(brain_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(used)
    }

    /// Look up a non-deleted file with the given content digest in a brain.
    /// Backs the duplicate-upload check.
    pub async fn find_by_digest(&mut self, brain_id: BrainId, sha256: &str) -> Result<Option<BrainFile>> {
        let file = sqlx::query_as::<_, BrainFile>(
            r#"
            SELECT * FROM brain_files
            WHERE brain_id = $1 AND sha256 = $2 AND status <> 'deleted'
            LIMIT 1
            "#,
        )
        .bind(brain_id)
        .bind(sha256)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(file)
    }

    /// Soft-delete a file record. Metadata is retained; the bytes stop
    /// counting against the brain's quota.
    pub async fn soft_delete(&mut self, id: FileId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE brain_files
            SET status = 'deleted'
            WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(id)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for BrainFiles<'c> {
    type CreateRequest = BrainFileCreateDBRequest;
    type UpdateRequest = BrainFileUpdateDBRequest;
    type Response = BrainFile;
    type Id = FileId;
    type Filter = BrainFileFilter;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let file = sqlx::query_as::<_, BrainFile>(
            r#"
            INSERT INTO brain_files (
                brain_id, filename, content_type, size_bytes, sha256,
                enable_summarization, openai_api_key_provided, status, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.brain_id)
        .bind(&request.filename)
        .bind(&request.content_type)
        .bind(request.size_bytes)
        .bind(&request.sha256)
        .bind(request.enable_summarization)
        .bind(request.openai_api_key_provided)
        .bind(request.status)
        .bind(request.uploaded_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(file)
    }

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let file = sqlx::query_as::<_, BrainFile>("SELECT * FROM brain_files WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(file)
    }

    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let files = sqlx::query_as::<_, BrainFile>("SELECT * FROM brain_files WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(files.into_iter().map(|f| (f.id, f)).collect())
    }

    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = sqlx::QueryBuilder::new("SELECT * FROM brain_files WHERE 1=1");

        if let Some(brain_id) = filter.brain_id {
            query.push(" AND brain_id = ");
            query.push_bind(brain_id);
        }

        if let Some(user_id) = filter.uploaded_by {
            query.push(" AND uploaded_by = ");
            query.push_bind(user_id);
        }

        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status);
        }

        query.push(" ORDER BY created_at ASC OFFSET ");
        query.push_bind(filter.skip);
        query.push(" LIMIT ");
        query.push_bind(filter.limit);

        let files = query.build_query_as::<BrainFile>().fetch_all(&mut *self.db).await?;

        Ok(files)
    }

    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // Hard delete from database (use soft_delete for normal deletions)
        let result = sqlx::query("DELETE FROM brain_files WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let file = sqlx::query_as::<_, BrainFile>(
            r#"
            UPDATE brain_files
            SET status = COALESCE($2, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.status)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        handlers::{Brains, Users},
        models::{brains::BrainCreateDBRequest, users::UserCreateDBRequest},
    };
    use sqlx::PgPool;

    async fn seed_brain(pool: &PgPool, max_size_bytes: i64) -> (UserId, BrainId) {
        let mut conn = pool.acquire().await.unwrap();
        let user = Users::new(&mut conn)
            .create(&UserCreateDBRequest {
                username: "filerepo".to_string(),
                email: "filerepo@example.com".to_string(),
            })
            .await
            .unwrap();
        let brain = Brains::new(&mut conn)
            .create(&BrainCreateDBRequest {
                name: "files".to_string(),
                max_size_bytes,
                created_by: user.id,
            })
            .await
            .unwrap();
        (user.id, brain.id)
    }

    fn create_request(brain_id: BrainId, uploaded_by: UserId, size: i64, sha: &str) -> BrainFileCreateDBRequest {
        BrainFileCreateDBRequest {
            brain_id,
            filename: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            size_bytes: size,
            sha256: sha.to_string(),
            enable_summarization: false,
            openai_api_key_provided: false,
            status: FileStatus::Pending,
            uploaded_by,
        }
    }

    #[sqlx::test]
    async fn test_used_bytes_ignores_deleted(pool: PgPool) {
        let (user_id, brain_id) = seed_brain(&pool, 10_000).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = BrainFiles::new(&mut conn);

        assert_eq!(repo.used_bytes(brain_id).await.unwrap(), 0);

        let first = repo.create(&create_request(brain_id, user_id, 300, "aaa")).await.unwrap();
        repo.create(&create_request(brain_id, user_id, 200, "bbb")).await.unwrap();
        assert_eq!(repo.used_bytes(brain_id).await.unwrap(), 500);

        repo.soft_delete(first.id).await.unwrap();
        assert_eq!(repo.used_bytes(brain_id).await.unwrap(), 200);
    }

    #[sqlx::test]
    async fn test_find_by_digest(pool: PgPool) {
        let (user_id, brain_id) = seed_brain(&pool, 10_000).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = BrainFiles::new(&mut conn);

        let file = repo.create(&create_request(brain_id, user_id, 300, "digest-1")).await.unwrap();

        let found = repo.find_by_digest(brain_id, "digest-1").await.unwrap();
        assert_eq!(found.map(|f| f.id), Some(file.id));

        // Soft-deleted files no longer block re-upload
        repo.soft_delete(file.id).await.unwrap();
        let found = repo.find_by_digest(brain_id, "digest-1").await.unwrap();
        assert!(found.is_none());
    }
}
