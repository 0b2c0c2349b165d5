use sqlx::SqlitePool;

use crate::config::SharingConfig;
use crate::db::models::{CreateNotification, NotificationKind, PromptVersion};
use crate::db::repository::{CollaboratorRepository, PromptRepository, VersionRepository};
use crate::error::{AppError, AppResult};
use crate::services::activity::ActivityService;
use crate::services::notifications::NotificationService;

// ============================================================================
// Version Service
// ============================================================================

/// Linear, last-writer-wins version history: an append-only ledger of
/// content snapshots with exactly one current snapshot per prompt.
pub struct VersionService {
    pool: SqlitePool,
    settings: SharingConfig,
    activity: ActivityService,
    notifications: NotificationService,
}

impl VersionService {
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

    /// Append a snapshot as the new current version. Racing commits on the
    /// same prompt serialize in the repository; the loser surfaces as
    /// `Conflict` and retrying is the caller's decision.
    pub async fn commit(
        &self,
        prompt_id: &str,
        title: &str,
        content: &str,
        author_id: &str,
        change_summary: &str,
    ) -> AppResult<PromptVersion> {
        if !self.settings.allow_version_history {
            return Err(AppError::validation("version history is disabled"));
        }

        PromptRepository::find_by_id(&self.pool, prompt_id)
            .await?
            .ok_or_else(|| AppError::not_found("prompt"))?;

        let version = VersionRepository::commit(
            &self.pool,
            prompt_id,
            title,
            content,
            author_id,
            change_summary,
        )
        .await?;

        self.activity
            .record(
                prompt_id,
                author_id,
                author_id,
                "version_created",
                &format!(
                    "Created version {}: {}",
                    version.version_number, change_summary
                ),
                None,
            )
            .await;

        let collaborators = CollaboratorRepository::list_active(&self.pool, prompt_id).await?;
        for collaborator in collaborators {
            if collaborator.user_id == author_id {
                continue;
            }
            self.notifications
                .notify_best_effort(CreateNotification {
                    user_id: collaborator.user_id,
                    kind: NotificationKind::PromptUpdated,
                    title: "Prompt updated".to_string(),
                    message: format!("A prompt you collaborate on is now at version {}", version.version_number),
                    prompt_id: Some(prompt_id.to_string()),
                    sender_id: Some(author_id.to_string()),
                    sender_name: Some(author_id.to_string()),
                    metadata: None,
                })
                .await;
        }

        Ok(version)
    }

    /// Full history, newest first.
    pub async fn history(&self, prompt_id: &str) -> AppResult<Vec<PromptVersion>> {
        VersionRepository::history(&self.pool, prompt_id).await
    }

    /// The current snapshot, if any version has been committed.
    pub async fn current(&self, prompt_id: &str) -> AppResult<Option<PromptVersion>> {
        VersionRepository::current(&self.pool, prompt_id).await
    }
}
