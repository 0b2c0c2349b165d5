use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Notification Models
// ============================================================================

/// Kinds of sharing-related notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PromptShared,
    PermissionChanged,
    CommentAdded,
    PromptUpdated,
    CollaborationInvite,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::PromptShared => "prompt_shared",
            NotificationKind::PermissionChanged => "permission_changed",
            NotificationKind::CommentAdded => "comment_added",
            NotificationKind::PromptUpdated => "prompt_updated",
            NotificationKind::CollaborationInvite => "collaboration_invite",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prompt_shared" => Ok(NotificationKind::PromptShared),
            "permission_changed" => Ok(NotificationKind::PermissionChanged),
            "comment_added" => Ok(NotificationKind::CommentAdded),
            "prompt_updated" => Ok(NotificationKind::PromptUpdated),
            "collaboration_invite" => Ok(NotificationKind::CollaborationInvite),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-user inbox entry describing a sharing event. Only the owning user
/// may flip it to read.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShareNotification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub prompt_id: Option<String>,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub read_at: Option<NaiveDateTime>,
    pub is_read: bool,
    pub metadata: Option<String>,
}

impl ShareNotification {
    /// Parse the raw metadata column; malformed JSON reads as `None`.
    pub fn metadata_json(&self) -> Option<serde_json::Value> {
        self.metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

/// Fields for a new (unread) notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub prompt_id: Option<String>,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub metadata: Option<serde_json::Value>,
}
