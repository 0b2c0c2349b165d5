use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::permission::{Permission, ShareStatus};

// ============================================================================
// Share Link Models
// ============================================================================

/// A bearer token granting time- and use-bounded access to a prompt.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShareLink {
    pub id: String,
    pub prompt_id: String,
    pub token: String,
    pub permission: Permission,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
    pub max_uses: Option<i64>,
    pub current_uses: i64,
    pub is_active: bool,
    pub description: String,
    pub last_accessed_at: Option<NaiveDateTime>,
}

impl ShareLink {
    /// A link grants access while it is active, unexpired and not
    /// use-exhausted. Expiry and exhaustion are checked lazily, never swept
    /// proactively, so this is the single source of truth for usability.
    pub fn is_usable(&self, now: NaiveDateTime) -> bool {
        self.is_active
            && self.expires_at.map(|e| now < e).unwrap_or(true)
            && self.max_uses.map(|m| self.current_uses < m).unwrap_or(true)
    }

    /// Derive the lifecycle status from the stored columns.
    pub fn status(&self, now: NaiveDateTime) -> ShareStatus {
        if !self.is_active {
            ShareStatus::Revoked
        } else if self.expires_at.map(|e| now >= e).unwrap_or(false)
            || self.max_uses.map(|m| self.current_uses >= m).unwrap_or(false)
        {
            ShareStatus::Expired
        } else {
            ShareStatus::Active
        }
    }
}

/// A creator-facing listing row: a share link joined with the prompt it
/// exposes, with the lifecycle status derived rather than stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedPrompt {
    pub id: String,
    pub prompt_id: String,
    pub prompt_title: String,
    pub token: String,
    pub owner_id: String,
    pub permission: Permission,
    pub status: ShareStatus,
    pub created_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
    pub access_count: i64,
    pub last_accessed_at: Option<NaiveDateTime>,
    pub description: String,
}
