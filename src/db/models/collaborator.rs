use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::permission::Permission;

// ============================================================================
// Collaborator Models
// ============================================================================

/// A durable, named party with a standing permission level on a prompt.
/// Unique per `(prompt_id, user_id)`; removal soft-deletes so activity-log
/// references stay valid.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: String,
    pub prompt_id: String,
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub permission: Permission,
    pub added_at: NaiveDateTime,
    pub last_active_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCollaborator {
    pub prompt_id: String,
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub permission: Permission,
}
