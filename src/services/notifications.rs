use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::config::SharingConfig;
use crate::db::models::{CreateNotification, ShareNotification};
use crate::db::repository::NotificationRepository;
use crate::error::AppResult;

// ============================================================================
// Notification Service
// ============================================================================

/// Delivery channel for notifications beyond durable storage (email, push).
///
/// The core's responsibility ends at the stored, queryable inbox entry; a
/// sink failure is logged and never propagated.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn deliver(&self, notification: &ShareNotification) -> AppResult<()>;
}

#[derive(Clone)]
pub struct NotificationService {
    pool: SqlitePool,
    settings: SharingConfig,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl NotificationService {
    pub fn new(pool: SqlitePool, settings: SharingConfig) -> Self {
        Self {
            pool,
            settings,
            sink: None,
        }
    }

    /// Attach an external delivery channel.
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Insert an unread inbox entry, then offer it to the sink. Returns
    /// `None` when notifications are disabled by configuration.
    pub async fn notify(
        &self,
        notification: CreateNotification,
    ) -> AppResult<Option<ShareNotification>> {
        if !self.settings.notifications_enabled {
            return Ok(None);
        }

        let stored = NotificationRepository::create(&self.pool, notification).await?;

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.deliver(&stored).await {
                tracing::warn!(
                    "Notification sink failed for notification {}: {:?}",
                    stored.id,
                    e
                );
            }
        }

        Ok(Some(stored))
    }

    /// Like `notify`, but swallows storage failures; used as a side channel
    /// by operations whose outcome must not depend on notification state.
    pub async fn notify_best_effort(&self, notification: CreateNotification) {
        let user_id = notification.user_id.clone();
        if let Err(e) = self.notify(notification).await {
            tracing::warn!("Failed to store notification for user {}: {:?}", user_id, e);
        }
    }

    /// A user's inbox, newest first.
    pub async fn inbox(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> AppResult<Vec<ShareNotification>> {
        NotificationRepository::find_by_user(&self.pool, user_id, unread_only).await
    }

    /// Mark one notification read; only its owner may flip it.
    pub async fn mark_read(&self, notification_id: &str, user_id: &str) -> AppResult<bool> {
        NotificationRepository::mark_read(&self.pool, notification_id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NotificationKind;
    use crate::db::test_support::{seed_prompt, test_pool};
    use std::sync::Mutex;

    struct RecordingSink {
        delivered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn deliver(&self, notification: &ShareNotification) -> AppResult<()> {
            self.delivered.lock().unwrap().push(notification.id.clone());
            Ok(())
        }
    }

    fn invite(user: &str) -> CreateNotification {
        CreateNotification {
            user_id: user.to_string(),
            kind: NotificationKind::CollaborationInvite,
            title: "Collaboration invitation".to_string(),
            message: "You've been invited to collaborate".to_string(),
            prompt_id: Some("p1".to_string()),
            sender_id: Some("alice".to_string()),
            sender_name: Some("Alice".to_string()),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn read_flip_leaves_full_inbox_intact() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let service = NotificationService::new(pool, SharingConfig::default());

        let stored = service.notify(invite("bob")).await.unwrap().unwrap();
        assert_eq!(service.inbox("bob", true).await.unwrap().len(), 1);

        assert!(service.mark_read(&stored.id, "bob").await.unwrap());
        assert!(service.inbox("bob", true).await.unwrap().is_empty());
        assert_eq!(service.inbox("bob", false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sink_receives_stored_notifications() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;

        let sink = Arc::new(RecordingSink {
            delivered: Mutex::new(Vec::new()),
        });
        let service =
            NotificationService::new(pool, SharingConfig::default()).with_sink(sink.clone());

        let stored = service.notify(invite("bob")).await.unwrap().unwrap();
        assert_eq!(*sink.delivered.lock().unwrap(), vec![stored.id]);
    }

    #[tokio::test]
    async fn disabled_notifications_store_nothing() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;

        let settings = SharingConfig {
            notifications_enabled: false,
            ..SharingConfig::default()
        };
        let service = NotificationService::new(pool, settings);

        assert!(service.notify(invite("bob")).await.unwrap().is_none());
        assert!(service.inbox("bob", false).await.unwrap().is_empty());
    }
}
