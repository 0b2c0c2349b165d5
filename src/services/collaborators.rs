use sqlx::SqlitePool;

use crate::config::SharingConfig;
use crate::db::models::{AddCollaborator, Collaborator, CreateNotification, NotificationKind, Permission};
use crate::db::repository::{CollaboratorRepository, PromptRepository};
use crate::error::{AppError, AppResult};
use crate::services::activity::ActivityService;
use crate::services::notifications::NotificationService;

// ============================================================================
// Collaborator Service
// ============================================================================

pub struct CollaboratorService {
    pool: SqlitePool,
    settings: SharingConfig,
    activity: ActivityService,
    notifications: NotificationService,
}

impl CollaboratorService {
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

    /// Resolve a user's effective permission on a prompt: the owner holds
    /// `Admin`; otherwise an active collaborator row decides; otherwise no
    /// access at all.
    pub async fn permission_for(
        &self,
        prompt_id: &str,
        user_id: &str,
    ) -> AppResult<Option<Permission>> {
        let prompt = PromptRepository::find_by_id(&self.pool, prompt_id)
            .await?
            .ok_or_else(|| AppError::not_found("prompt"))?;

        if prompt.owner_id == user_id {
            return Ok(Some(Permission::Admin));
        }

        Ok(CollaboratorRepository::find_active(&self.pool, prompt_id, user_id)
            .await?
            .map(|c| c.permission))
    }

    async fn require(
        &self,
        prompt_id: &str,
        user_id: &str,
        needed: Permission,
    ) -> AppResult<()> {
        match self.permission_for(prompt_id, user_id).await? {
            Some(granted) if granted.allows(needed) => Ok(()),
            _ => Err(AppError::Forbidden),
        }
    }

    /// Grant or refresh a collaborator. Re-adding the same user updates the
    /// existing row (never a duplicate) and reactivates it if it had been
    /// removed. The invitee gets an inbox notification.
    pub async fn add_or_update(
        &self,
        add: AddCollaborator,
        added_by: &str,
    ) -> AppResult<Collaborator> {
        self.require(&add.prompt_id, added_by, Permission::Write)
            .await?;

        let existing =
            CollaboratorRepository::find_active(&self.pool, &add.prompt_id, &add.user_id).await?;
        if existing.is_none() {
            let active = CollaboratorRepository::count_active(&self.pool, &add.prompt_id).await?;
            if active >= self.settings.max_collaborators {
                return Err(AppError::validation("collaborator limit reached"));
            }
        }

        let collaborator = CollaboratorRepository::upsert(&self.pool, add).await?;

        self.activity
            .record(
                &collaborator.prompt_id,
                added_by,
                added_by,
                "collaborator_added",
                &format!(
                    "Added {} as collaborator with {} permission",
                    collaborator.user_name, collaborator.permission
                ),
                None,
            )
            .await;

        self.notifications
            .notify_best_effort(CreateNotification {
                user_id: collaborator.user_id.clone(),
                kind: NotificationKind::CollaborationInvite,
                title: "Collaboration invitation".to_string(),
                message: format!(
                    "You've been invited to collaborate on a prompt with {} permission",
                    collaborator.permission
                ),
                prompt_id: Some(collaborator.prompt_id.clone()),
                sender_id: Some(added_by.to_string()),
                sender_name: Some(added_by.to_string()),
                metadata: None,
            })
            .await;

        Ok(collaborator)
    }

    /// Active collaborators, oldest grant first.
    pub async fn list(&self, prompt_id: &str) -> AppResult<Vec<Collaborator>> {
        CollaboratorRepository::list_active(&self.pool, prompt_id).await
    }

    /// Soft-remove a collaborator. Requires `Write` or better on the
    /// prompt; the row stays behind so the audit trail keeps resolving.
    pub async fn remove(
        &self,
        prompt_id: &str,
        user_id: &str,
        requested_by: &str,
    ) -> AppResult<bool> {
        self.require(prompt_id, requested_by, Permission::Write)
            .await?;

        let removed = CollaboratorRepository::soft_delete(&self.pool, prompt_id, user_id).await?;
        if removed {
            self.activity
                .record(
                    prompt_id,
                    requested_by,
                    requested_by,
                    "collaborator_removed",
                    &format!("Removed collaborator {}", user_id),
                    None,
                )
                .await;
        }

        Ok(removed)
    }

    /// Change a standing grant. Administering permissions requires `Admin`;
    /// the affected user is told about the change.
    pub async fn change_permission(
        &self,
        prompt_id: &str,
        user_id: &str,
        permission: Permission,
        requested_by: &str,
    ) -> AppResult<Collaborator> {
        self.require(prompt_id, requested_by, Permission::Admin)
            .await?;

        let collaborator =
            CollaboratorRepository::set_permission(&self.pool, prompt_id, user_id, permission)
                .await?
                .ok_or_else(|| AppError::not_found("collaborator"))?;

        self.activity
            .record(
                prompt_id,
                requested_by,
                requested_by,
                "permission_changed",
                &format!("Changed {} permission to {}", user_id, permission),
                None,
            )
            .await;

        self.notifications
            .notify_best_effort(CreateNotification {
                user_id: user_id.to_string(),
                kind: NotificationKind::PermissionChanged,
                title: "Permission changed".to_string(),
                message: format!("Your permission on a shared prompt is now {}", permission),
                prompt_id: Some(prompt_id.to_string()),
                sender_id: Some(requested_by.to_string()),
                sender_name: Some(requested_by.to_string()),
                metadata: None,
            })
            .await;

        Ok(collaborator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_prompt, test_pool};

    fn services(pool: &SqlitePool, settings: SharingConfig) -> CollaboratorService {
        let notifications = NotificationService::new(pool.clone(), settings.clone());
        CollaboratorService::new(pool.clone(), settings, notifications)
    }

    fn collaborator(user: &str, permission: Permission) -> AddCollaborator {
        AddCollaborator {
            prompt_id: "p1".to_string(),
            user_id: user.to_string(),
            user_name: user.to_string(),
            email: format!("{user}@example.com"),
            permission,
        }
    }

    #[tokio::test]
    async fn invite_lands_in_the_invitee_inbox() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let service = services(&pool, SharingConfig::default());

        service
            .add_or_update(collaborator("bob", Permission::Write), "alice")
            .await
            .unwrap();

        let notifications = NotificationService::new(pool.clone(), SharingConfig::default());
        let unread = notifications.inbox("bob", true).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].kind, NotificationKind::CollaborationInvite);
        assert_eq!(unread[0].sender_id.as_deref(), Some("alice"));

        notifications.mark_read(&unread[0].id, "bob").await.unwrap();
        assert!(notifications.inbox("bob", true).await.unwrap().is_empty());
        assert_eq!(notifications.inbox("bob", false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn adding_requires_write_or_better() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let service = services(&pool, SharingConfig::default());

        // A stranger cannot add collaborators.
        assert!(matches!(
            service
                .add_or_update(collaborator("bob", Permission::Read), "mallory")
                .await,
            Err(AppError::Forbidden)
        ));

        // A read-only collaborator cannot either.
        service
            .add_or_update(collaborator("carol", Permission::Read), "alice")
            .await
            .unwrap();
        assert!(matches!(
            service
                .add_or_update(collaborator("bob", Permission::Read), "carol")
                .await,
            Err(AppError::Forbidden)
        ));

        // A writer can.
        service
            .add_or_update(collaborator("dave", Permission::Write), "alice")
            .await
            .unwrap();
        service
            .add_or_update(collaborator("bob", Permission::Read), "dave")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn remove_requires_write_and_soft_deletes() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let service = services(&pool, SharingConfig::default());

        service
            .add_or_update(collaborator("bob", Permission::Read), "alice")
            .await
            .unwrap();

        assert!(matches!(
            service.remove("p1", "bob", "bob").await,
            Err(AppError::Forbidden)
        ));

        assert!(service.remove("p1", "bob", "alice").await.unwrap());
        assert!(service.list("p1").await.unwrap().is_empty());
        assert!(!service.remove("p1", "bob", "alice").await.unwrap());
    }

    #[tokio::test]
    async fn collaborator_cap_is_enforced() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;

        let settings = SharingConfig {
            max_collaborators: 2,
            ..SharingConfig::default()
        };
        let service = services(&pool, settings);

        service
            .add_or_update(collaborator("bob", Permission::Read), "alice")
            .await
            .unwrap();
        service
            .add_or_update(collaborator("carol", Permission::Read), "alice")
            .await
            .unwrap();

        assert!(matches!(
            service
                .add_or_update(collaborator("dave", Permission::Read), "alice")
                .await,
            Err(AppError::Validation(_))
        ));

        // Updating an existing collaborator is not capped.
        service
            .add_or_update(collaborator("bob", Permission::Write), "alice")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn permission_change_is_admin_only_and_notifies() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let service = services(&pool, SharingConfig::default());

        service
            .add_or_update(collaborator("bob", Permission::Read), "alice")
            .await
            .unwrap();
        service
            .add_or_update(collaborator("dave", Permission::Write), "alice")
            .await
            .unwrap();

        // Write is not enough to administer grants.
        assert!(matches!(
            service
                .change_permission("p1", "bob", Permission::Write, "dave")
                .await,
            Err(AppError::Forbidden)
        ));

        let updated = service
            .change_permission("p1", "bob", Permission::Write, "alice")
            .await
            .unwrap();
        assert_eq!(updated.permission, Permission::Write);

        let notifications = NotificationService::new(pool.clone(), SharingConfig::default());
        let inbox = notifications.inbox("bob", true).await.unwrap();
        assert!(inbox
            .iter()
            .any(|n| n.kind == NotificationKind::PermissionChanged));
    }

    #[tokio::test]
    async fn owner_holds_admin_by_definition() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let service = services(&pool, SharingConfig::default());

        assert_eq!(
            service.permission_for("p1", "alice").await.unwrap(),
            Some(Permission::Admin)
        );
        assert_eq!(service.permission_for("p1", "bob").await.unwrap(), None);
        assert!(matches!(
            service.permission_for("ghost", "alice").await,
            Err(AppError::NotFound(_))
        ));
    }
}
