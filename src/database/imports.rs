use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::ImportLog;

pub struct ImportLogRepository {
    pool: PgPool,
}

impl ImportLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        user_id: Uuid,
        file_name: &str,
        upload_date: DateTime<Utc>,
        item_count: i32,
    ) -> Result<ImportLog, DatabaseError> {
        let log = sqlx::query_as::<_, ImportLog>(
            "INSERT INTO import_logs (id, user_id, file_name, upload_date, item_count) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, file_name, upload_date, item_count, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(file_name)
        .bind(upload_date)
        .bind(item_count)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    /// Newest first, so the head of the list is the "last uploaded file"
    pub async fn list(&self) -> Result<Vec<ImportLog>, DatabaseError> {
        let logs = sqlx::query_as::<_, ImportLog>(
            "SELECT id, user_id, file_name, upload_date, item_count, created_at \
             FROM import_logs ORDER BY upload_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
