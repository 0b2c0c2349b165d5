use sqlx::SqlitePool;

use crate::db::models::PromptSnapshot;
use crate::error::{AppError, AppResult};

// ============================================================================
// Prompt Repository (read-only collaborator)
// ============================================================================

/// Read access to the prompts owned by the surrounding prompt-management
/// service. This core never creates, edits or deletes a prompt.
pub struct PromptRepository;

impl PromptRepository {
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<PromptSnapshot>> {
        sqlx::query_as::<_, PromptSnapshot>(
            r#"
            SELECT id, title, content, owner_id, created_at, updated_at
            FROM prompts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }
}
