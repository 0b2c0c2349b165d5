use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Prompt Snapshot
// ============================================================================

/// Read-only view of a prompt owned by the surrounding prompt-management
/// service. This core resolves it for share-link consumption but never
/// writes it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PromptSnapshot {
    pub id: String,
    pub title: String,
    pub content: String,
    pub owner_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
