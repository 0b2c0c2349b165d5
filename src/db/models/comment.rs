use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Comment Models
// ============================================================================

/// A comment on a shared prompt. `parent_id` forms a reply tree; comments
/// are never hard-deleted, only marked resolved.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PromptComment {
    pub id: String,
    pub prompt_id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub parent_id: Option<String>,
    pub is_resolved: bool,
}
