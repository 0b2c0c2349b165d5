use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Activity Log Models
// ============================================================================

/// One entry in the append-only audit trail of a shared prompt. Rows are
/// never updated or deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShareActivity {
    pub id: String,
    pub prompt_id: String,
    pub user_id: String,
    pub user_name: String,
    pub action: String,
    pub details: String,
    pub timestamp: NaiveDateTime,
    pub metadata: Option<String>,
}

impl ShareActivity {
    /// Parse the raw metadata column; malformed JSON reads as `None`.
    pub fn metadata_json(&self) -> Option<serde_json::Value> {
        self.metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}
