use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Audit row written on every successful bulk import; the newest entry
/// backs the "last uploaded file" display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ImportLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub item_count: i32,
    pub created_at: DateTime<Utc>,
}
