use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::ShareActivity;
use crate::error::{AppError, AppResult};

const ACTIVITY_COLUMNS: &str = r#"
    id,
    prompt_id,
    user_id,
    user_name,
    action,
    details,
    timestamp,
    metadata
"#;

// ============================================================================
// Share Activity Repository
// ============================================================================

pub struct ActivityRepository;

impl ActivityRepository {
    /// Append one audit entry. Rows are insert-only; nothing in this crate
    /// updates or deletes them.
    pub async fn append(
        pool: &SqlitePool,
        prompt_id: &str,
        user_id: &str,
        user_name: &str,
        action: &str,
        details: &str,
        metadata: Option<&serde_json::Value>,
    ) -> AppResult<ShareActivity> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();
        let metadata_json = metadata.map(|m| m.to_string());

        let sql = format!(
            r#"
            INSERT INTO share_activity (
                id, prompt_id, user_id, user_name, action, details, timestamp, metadata
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {ACTIVITY_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ShareActivity>(&sql)
            .bind(id)
            .bind(prompt_id)
            .bind(user_id)
            .bind(user_name)
            .bind(action)
            .bind(details)
            .bind(now)
            .bind(metadata_json)
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)
    }

    /// Most recent activity first, bounded by `limit`.
    pub async fn tail(
        pool: &SqlitePool,
        prompt_id: &str,
        limit: i64,
    ) -> AppResult<Vec<ShareActivity>> {
        let sql = format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}
            FROM share_activity
            WHERE prompt_id = ?
            ORDER BY timestamp DESC
            LIMIT ?
            "#
        );

        sqlx::query_as::<_, ShareActivity>(&sql)
            .bind(prompt_id)
            .bind(limit)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }
}
