use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Prompt Version Models
// ============================================================================

/// One snapshot in a prompt's linear history. For a given prompt the
/// version numbers are contiguous from 1 and exactly one row is current.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PromptVersion {
    pub id: String,
    pub prompt_id: String,
    pub version_number: i64,
    pub title: String,
    pub content: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub change_summary: String,
    pub is_current: bool,
}
