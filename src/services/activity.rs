use sqlx::SqlitePool;

use crate::db::models::ShareActivity;
use crate::db::repository::ActivityRepository;
use crate::error::AppResult;

// ============================================================================
// Activity Service
// ============================================================================

/// Append-only audit trail of mutating actions on a shared prompt.
///
/// Recording is best-effort: a storage failure here is reported but never
/// fails the primary operation it describes.
#[derive(Clone)]
pub struct ActivityService {
    pool: SqlitePool,
}

impl ActivityService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        prompt_id: &str,
        user_id: &str,
        user_name: &str,
        action: &str,
        details: &str,
        metadata: Option<&serde_json::Value>,
    ) {
        if let Err(e) = ActivityRepository::append(
            &self.pool, prompt_id, user_id, user_name, action, details, metadata,
        )
        .await
        {
            tracing::warn!(
                "Failed to record activity '{}' for prompt {}: {:?}",
                action,
                prompt_id,
                e
            );
        }
    }

    /// Most recent activity first, bounded by `limit`.
    pub async fn tail(&self, prompt_id: &str, limit: i64) -> AppResult<Vec<ShareActivity>> {
        ActivityRepository::tail(&self.pool, prompt_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_prompt, test_pool};

    #[tokio::test]
    async fn record_then_tail() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let activity = ActivityService::new(pool);

        activity
            .record("p1", "alice", "Alice", "share_link_created", "Created share link", None)
            .await;
        activity
            .record("p1", "bob", "Bob", "prompt_accessed", "Accessed shared prompt", None)
            .await;

        let tail = activity.tail("p1", 10).await.unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].action, "prompt_accessed");
        assert_eq!(tail[1].action, "share_link_created");
    }
}
