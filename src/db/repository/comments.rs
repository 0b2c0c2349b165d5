use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::PromptComment;
use crate::error::{AppError, AppResult};

const COMMENT_COLUMNS: &str = r#"
    id,
    prompt_id,
    user_id,
    user_name,
    content,
    created_at,
    updated_at,
    parent_id,
    is_resolved
"#;

// ============================================================================
// Comment Repository
// ============================================================================

pub struct CommentRepository;

impl CommentRepository {
    pub async fn create(
        pool: &SqlitePool,
        prompt_id: &str,
        user_id: &str,
        user_name: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> AppResult<PromptComment> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let sql = format!(
            r#"
            INSERT INTO prompt_comments (
                id, prompt_id, user_id, user_name, content, created_at,
                updated_at, parent_id, is_resolved
            ) VALUES (?, ?, ?, ?, ?, ?, NULL, ?, 0)
            RETURNING {COMMENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, PromptComment>(&sql)
            .bind(id)
            .bind(prompt_id)
            .bind(user_id)
            .bind(user_name)
            .bind(content)
            .bind(now)
            .bind(parent_id)
            .fetch_one(pool)
            .await
            .map_err(AppError::from_write)
    }

    /// A comment by id, constrained to the given prompt. Used to validate
    /// that a reply parent lives on the same prompt.
    pub async fn find_on_prompt(
        pool: &SqlitePool,
        comment_id: &str,
        prompt_id: &str,
    ) -> AppResult<Option<PromptComment>> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM prompt_comments
            WHERE id = ? AND prompt_id = ?
            "#
        );

        sqlx::query_as::<_, PromptComment>(&sql)
            .bind(comment_id)
            .bind(prompt_id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)
    }

    /// Chronological listing; callers rebuild the reply tree from
    /// `parent_id`.
    pub async fn list(pool: &SqlitePool, prompt_id: &str) -> AppResult<Vec<PromptComment>> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM prompt_comments
            WHERE prompt_id = ?
            ORDER BY created_at ASC
            "#
        );

        sqlx::query_as::<_, PromptComment>(&sql)
            .bind(prompt_id)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }

    /// Comments are never hard-deleted; resolution is the terminal state.
    pub async fn mark_resolved(
        pool: &SqlitePool,
        comment_id: &str,
        prompt_id: &str,
    ) -> AppResult<bool> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE prompt_comments
            SET is_resolved = 1, updated_at = ?
            WHERE id = ? AND prompt_id = ?
            "#,
        )
        .bind(now)
        .bind(comment_id)
        .bind(prompt_id)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
