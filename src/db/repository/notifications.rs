use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{CreateNotification, ShareNotification};
use crate::error::{AppError, AppResult};

const NOTIFICATION_COLUMNS: &str = r#"
    id,
    user_id,
    kind,
    title,
    message,
    prompt_id,
    sender_id,
    sender_name,
    created_at,
    read_at,
    is_read,
    metadata
"#;

// ============================================================================
// Share Notification Repository
// ============================================================================

pub struct NotificationRepository;

impl NotificationRepository {
    pub async fn create(
        pool: &SqlitePool,
        notification: CreateNotification,
    ) -> AppResult<ShareNotification> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();
        let metadata_json = notification.metadata.map(|m| m.to_string());

        let sql = format!(
            r#"
            INSERT INTO share_notifications (
                id, user_id, kind, title, message, prompt_id, sender_id,
                sender_name, created_at, read_at, is_read, metadata
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, 0, ?)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ShareNotification>(&sql)
            .bind(id)
            .bind(notification.user_id)
            .bind(notification.kind)
            .bind(notification.title)
            .bind(notification.message)
            .bind(notification.prompt_id)
            .bind(notification.sender_id)
            .bind(notification.sender_name)
            .bind(now)
            .bind(metadata_json)
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)
    }

    /// A user's inbox, newest first; optionally unread entries only.
    pub async fn find_by_user(
        pool: &SqlitePool,
        user_id: &str,
        unread_only: bool,
    ) -> AppResult<Vec<ShareNotification>> {
        let sql = format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM share_notifications
            WHERE user_id = ?
              AND (? = 0 OR is_read = 0)
            ORDER BY created_at DESC
            "#
        );

        sqlx::query_as::<_, ShareNotification>(&sql)
            .bind(user_id)
            .bind(unread_only)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }

    /// Flip to read, scoped to the owning user. Returns `false` when the
    /// notification does not exist or belongs to someone else.
    pub async fn mark_read(
        pool: &SqlitePool,
        notification_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE share_notifications
            SET is_read = 1, read_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(now)
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NotificationKind;
    use crate::db::test_support::{seed_prompt, test_pool};

    fn invite(user: &str) -> CreateNotification {
        CreateNotification {
            user_id: user.to_string(),
            kind: NotificationKind::CollaborationInvite,
            title: "Collaboration invitation".to_string(),
            message: "You've been invited".to_string(),
            prompt_id: Some("p1".to_string()),
            sender_id: Some("alice".to_string()),
            sender_name: Some("Alice".to_string()),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn mark_read_is_ownership_scoped() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;

        let n = NotificationRepository::create(&pool, invite("bob")).await.unwrap();
        assert!(!n.is_read);
        assert!(n.read_at.is_none());

        // Someone else's id does not flip it.
        assert!(!NotificationRepository::mark_read(&pool, &n.id, "mallory")
            .await
            .unwrap());
        assert!(NotificationRepository::mark_read(&pool, &n.id, "bob")
            .await
            .unwrap());

        let inbox = NotificationRepository::find_by_user(&pool, "bob", false)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert!(inbox[0].is_read);
        assert!(inbox[0].read_at.is_some());
    }

    #[tokio::test]
    async fn unread_filter_hides_read_entries() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;

        let first = NotificationRepository::create(&pool, invite("bob")).await.unwrap();
        NotificationRepository::create(&pool, invite("bob")).await.unwrap();
        NotificationRepository::mark_read(&pool, &first.id, "bob")
            .await
            .unwrap();

        let unread = NotificationRepository::find_by_user(&pool, "bob", true)
            .await
            .unwrap();
        assert_eq!(unread.len(), 1);
        assert_ne!(unread[0].id, first.id);

        let full = NotificationRepository::find_by_user(&pool, "bob", false)
            .await
            .unwrap();
        assert_eq!(full.len(), 2);
    }
}
