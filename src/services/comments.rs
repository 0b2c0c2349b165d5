use sqlx::SqlitePool;

use crate::config::SharingConfig;
use crate::db::models::{CreateNotification, NotificationKind, PromptComment};
use crate::db::repository::{
    CollaboratorRepository, CommentRepository, PromptRepository,
};
use crate::error::{AppError, AppResult};
use crate::services::activity::ActivityService;
use crate::services::notifications::NotificationService;

// ============================================================================
// Comment Service
// ============================================================================

pub struct CommentService {
    pool: SqlitePool,
    settings: SharingConfig,
    activity: ActivityService,
    notifications: NotificationService,
}

impl CommentService {
    pub fn new(
        pool: SqlitePool,
        settings: SharingConfig,
        notifications: NotificationService,
    ) -> Self {
        let activity = ActivityService::new(pool.clone());
        Self {
            pool,
            settings,
            activity,
            notifications,
        }
    }

    /// Post a comment, optionally as a reply. A reply parent must be an
    /// existing comment on the same prompt.
    pub async fn post(
        &self,
        prompt_id: &str,
        user_id: &str,
        user_name: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> AppResult<PromptComment> {
        if !self.settings.allow_comments {
            return Err(AppError::validation("comments are disabled"));
        }
        if content.trim().is_empty() {
            return Err(AppError::validation("comment content is empty"));
        }

        PromptRepository::find_by_id(&self.pool, prompt_id)
            .await?
            .ok_or_else(|| AppError::not_found("prompt"))?;

        if let Some(parent) = parent_id {
            CommentRepository::find_on_prompt(&self.pool, parent, prompt_id)
                .await?
                .ok_or_else(|| {
                    AppError::validation("parent comment does not exist on this prompt")
                })?;
        }

        let comment = CommentRepository::create(
            &self.pool, prompt_id, user_id, user_name, content, parent_id,
        )
        .await?;

        // Commenting counts as collaborator activity when the author is one.
        if let Err(e) =
            CollaboratorRepository::touch_last_active(&self.pool, prompt_id, user_id).await
        {
            tracing::warn!("Failed to touch last_active for {}: {:?}", user_id, e);
        }

        let mut excerpt: String = content.chars().take(50).collect();
        if excerpt.len() < content.len() {
            excerpt.push_str("...");
        }
        self.activity
            .record(
                prompt_id,
                user_id,
                user_name,
                "comment_added",
                &format!("Added comment: {}", excerpt),
                None,
            )
            .await;

        let collaborators = CollaboratorRepository::list_active(&self.pool, prompt_id).await?;
        for collaborator in collaborators {
            if collaborator.user_id == user_id {
                continue;
            }
            self.notifications
                .notify_best_effort(CreateNotification {
                    user_id: collaborator.user_id,
                    kind: NotificationKind::CommentAdded,
                    title: "New comment".to_string(),
                    message: format!("{} commented on a prompt you collaborate on", user_name),
                    prompt_id: Some(prompt_id.to_string()),
                    sender_id: Some(user_id.to_string()),
                    sender_name: Some(user_name.to_string()),
                    metadata: None,
                })
                .await;
        }

        Ok(comment)
    }

    /// Chronological comments; the reply tree is rebuilt from `parent_id`.
    pub async fn list(&self, prompt_id: &str) -> AppResult<Vec<PromptComment>> {
        CommentRepository::list(&self.pool, prompt_id).await
    }

    /// Mark a comment resolved. Comments are never deleted.
    pub async fn resolve(&self, prompt_id: &str, comment_id: &str) -> AppResult<bool> {
        CommentRepository::mark_resolved(&self.pool, comment_id, prompt_id).await
    }
}
