use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::PromptVersion;
use crate::error::{AppError, AppResult};

const VERSION_COLUMNS: &str = r#"
    id,
    prompt_id,
    version_number,
    title,
    content,
    created_by,
    created_at,
    change_summary,
    is_current
"#;

// ============================================================================
// Prompt Version Repository
// ============================================================================

pub struct VersionRepository;

impl VersionRepository {
    /// Append a new snapshot as the current version.
    ///
    /// Read-max, demote and insert run in one transaction scoped to the
    /// prompt. Two commits racing on the same prompt compute the same next
    /// number; the `UNIQUE(prompt_id, version_number)` constraint rejects
    /// the loser, which surfaces as `Conflict` and keeps the ledger gapless.
    pub async fn commit(
        pool: &SqlitePool,
        prompt_id: &str,
        title: &str,
        content: &str,
        created_by: &str,
        change_summary: &str,
    ) -> AppResult<PromptVersion> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let mut tx = pool.begin().await.map_err(AppError::Database)?;

        let max_version: i64 = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(version_number), 0) FROM prompt_versions WHERE prompt_id = ?",
        )
        .bind(prompt_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        sqlx::query("UPDATE prompt_versions SET is_current = 0 WHERE prompt_id = ?")
            .bind(prompt_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let sql = format!(
            r#"
            INSERT INTO prompt_versions (
                id, prompt_id, version_number, title, content, created_by,
                created_at, change_summary, is_current
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)
            RETURNING {VERSION_COLUMNS}
            "#
        );

        let version = sqlx::query_as::<_, PromptVersion>(&sql)
            .bind(id)
            .bind(prompt_id)
            .bind(max_version + 1)
            .bind(title)
            .bind(content)
            .bind(created_by)
            .bind(now)
            .bind(change_summary)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::from_write)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(version)
    }

    /// Full history, newest version first.
    pub async fn history(pool: &SqlitePool, prompt_id: &str) -> AppResult<Vec<PromptVersion>> {
        let sql = format!(
            r#"
            SELECT {VERSION_COLUMNS}
            FROM prompt_versions
            WHERE prompt_id = ?
            ORDER BY version_number DESC
            "#
        );

        sqlx::query_as::<_, PromptVersion>(&sql)
            .bind(prompt_id)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }

    /// The single snapshot marked current.
    pub async fn current(pool: &SqlitePool, prompt_id: &str) -> AppResult<Option<PromptVersion>> {
        let sql = format!(
            r#"
            SELECT {VERSION_COLUMNS}
            FROM prompt_versions
            WHERE prompt_id = ? AND is_current = 1
            "#
        );

        sqlx::query_as::<_, PromptVersion>(&sql)
            .bind(prompt_id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)
    }
}
