use chrono::{Duration, NaiveDateTime, Utc};
use sqlx::SqlitePool;

use crate::config::SharingConfig;
use crate::db::models::{Permission, PromptSnapshot, ShareLink, SharedPrompt};
use crate::db::repository::{PromptRepository, ShareLinkRepository};
use crate::error::{AppError, AppResult};
use crate::services::activity::ActivityService;

// ============================================================================
// Share Link Service
// ============================================================================

/// Parameters for issuing a new share link.
#[derive(Debug, Clone)]
pub struct IssueShareLink {
    pub prompt_id: String,
    pub issued_by: String,
    /// Falls back to the configured default permission.
    pub permission: Option<Permission>,
    /// Days until expiry; `None` falls back to the configured default TTL
    /// (which may itself be "never").
    pub ttl_days: Option<i64>,
    pub max_uses: Option<i64>,
    pub description: String,
}

/// What a successful share-link consumption hands back: the prompt snapshot
/// at the granted permission, plus the link's provenance.
#[derive(Debug, Clone)]
pub struct SharedPromptAccess {
    pub prompt: PromptSnapshot,
    pub permission: Permission,
    pub shared_by: String,
    pub shared_at: NaiveDateTime,
    pub description: String,
}

pub struct ShareLinkService {
    pool: SqlitePool,
    settings: SharingConfig,
    activity: ActivityService,
}

impl ShareLinkService {
    pub fn new(pool: SqlitePool, settings: SharingConfig) -> Self {
        let activity = ActivityService::new(pool.clone());
        Self {
            pool,
            settings,
            activity,
        }
    }

    /// Issue a new share link on a prompt.
    pub async fn issue(&self, request: IssueShareLink) -> AppResult<ShareLink> {
        if let Some(ttl) = request.ttl_days {
            if ttl <= 0 {
                return Err(AppError::validation("ttl_days must be positive"));
            }
        }
        if let Some(max) = request.max_uses {
            if max <= 0 {
                return Err(AppError::validation("max_uses must be positive"));
            }
        }

        PromptRepository::find_by_id(&self.pool, &request.prompt_id)
            .await?
            .ok_or_else(|| AppError::not_found("prompt"))?;

        let permission = request
            .permission
            .unwrap_or(self.settings.default_permission);
        let ttl_days = request.ttl_days.or(self.settings.default_link_ttl_days);
        let expires_at = ttl_days.map(|days| Utc::now().naive_utc() + Duration::days(days));

        let link = ShareLinkRepository::create(
            &self.pool,
            &request.prompt_id,
            permission,
            &request.issued_by,
            expires_at,
            request.max_uses,
            &request.description,
        )
        .await?;

        self.activity
            .record(
                &request.prompt_id,
                &request.issued_by,
                &request.issued_by,
                "share_link_created",
                &format!("Created share link with {} permission", permission),
                None,
            )
            .await;

        Ok(link)
    }

    /// Look up a link that still grants access. `None` covers missing,
    /// revoked, expired and use-exhausted alike.
    pub async fn resolve(&self, token: &str) -> AppResult<Option<ShareLink>> {
        ShareLinkRepository::find_usable(&self.pool, token).await
    }

    /// Consume one use of a link and return the prompt it exposes.
    ///
    /// The use-count check-and-increment is a single atomic statement in the
    /// repository, so concurrent consumers can never push `current_uses`
    /// past `max_uses`.
    pub async fn consume(
        &self,
        token: &str,
        consumer_id: &str,
    ) -> AppResult<Option<SharedPromptAccess>> {
        let link = match ShareLinkRepository::consume_use(&self.pool, token).await? {
            Some(link) => link,
            None => return Ok(None),
        };

        let prompt = PromptRepository::find_by_id(&self.pool, &link.prompt_id)
            .await?
            .ok_or_else(|| AppError::not_found("prompt"))?;

        self.activity
            .record(
                &link.prompt_id,
                consumer_id,
                consumer_id,
                "prompt_accessed",
                "Accessed shared prompt via link",
                None,
            )
            .await;

        Ok(Some(SharedPromptAccess {
            prompt,
            permission: link.permission,
            shared_by: link.created_by,
            shared_at: link.created_at,
            description: link.description,
        }))
    }

    /// Deactivate a link. Only its creator may do so; any other requester
    /// gets `false` with no state change and no confirmation the token
    /// exists.
    pub async fn revoke(&self, token: &str, requester_id: &str) -> AppResult<bool> {
        match ShareLinkRepository::revoke(&self.pool, token, requester_id).await? {
            Some(link) => {
                self.activity
                    .record(
                        &link.prompt_id,
                        requester_id,
                        requester_id,
                        "share_link_revoked",
                        "Revoked share link",
                        None,
                    )
                    .await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// A creator's links on one prompt, newest first.
    pub async fn list_for_prompt(
        &self,
        prompt_id: &str,
        created_by: &str,
    ) -> AppResult<Vec<ShareLink>> {
        ShareLinkRepository::list_for_prompt(&self.pool, prompt_id, created_by).await
    }

    /// All prompts a user currently shares, with derived lifecycle status.
    pub async fn shared_by_user(&self, user_id: &str) -> AppResult<Vec<SharedPrompt>> {
        ShareLinkRepository::shared_by_user(&self.pool, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_prompt, test_pool};

    fn service(pool: &SqlitePool) -> ShareLinkService {
        ShareLinkService::new(pool.clone(), SharingConfig::default())
    }

    fn read_link(prompt_id: &str, max_uses: Option<i64>) -> IssueShareLink {
        IssueShareLink {
            prompt_id: prompt_id.to_string(),
            issued_by: "alice".to_string(),
            permission: Some(Permission::Read),
            ttl_days: None,
            max_uses,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn rejects_non_positive_bounds() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let service = service(&pool);

        let mut bad_ttl = read_link("p1", None);
        bad_ttl.ttl_days = Some(0);
        assert!(matches!(
            service.issue(bad_ttl).await,
            Err(AppError::Validation(_))
        ));

        assert!(matches!(
            service.issue(read_link("p1", Some(-1))).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn issue_requires_an_existing_prompt() {
        let pool = test_pool().await;
        let service = service(&pool);

        assert!(matches!(
            service.issue(read_link("ghost", None)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn default_permission_applies_when_unspecified() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let service = service(&pool);

        let mut request = read_link("p1", None);
        request.permission = None;
        let link = service.issue(request).await.unwrap();
        assert_eq!(link.permission, Permission::Read);
        assert!(link.expires_at.is_none());
    }

    #[tokio::test]
    async fn share_lifecycle() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let service = service(&pool);

        let link = service.issue(read_link("p1", Some(2))).await.unwrap();

        let first = service.consume(&link.token, "bob").await.unwrap().unwrap();
        assert_eq!(first.prompt.title, "Prompt p1");
        assert_eq!(first.permission, Permission::Read);
        assert_eq!(first.shared_by, "alice");

        service.consume(&link.token, "carol").await.unwrap().unwrap();

        // Third use is exhausted; indistinguishable from a dead token.
        assert!(service.consume(&link.token, "dave").await.unwrap().is_none());

        assert!(service.revoke(&link.token, "alice").await.unwrap());
        assert!(service.resolve(&link.token).await.unwrap().is_none());

        let actions: Vec<String> = ActivityService::new(pool.clone())
            .tail("p1", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                "share_link_revoked",
                "prompt_accessed",
                "prompt_accessed",
                "share_link_created",
            ]
        );
    }

    #[tokio::test]
    async fn revoke_by_non_owner_is_a_quiet_no() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;
        let service = service(&pool);

        let link = service.issue(read_link("p1", None)).await.unwrap();
        assert!(!service.revoke(&link.token, "mallory").await.unwrap());
        assert!(service.resolve(&link.token).await.unwrap().is_some());

        // Unknown tokens answer the same way.
        assert!(!service.revoke("no-such-token", "mallory").await.unwrap());
    }

    #[tokio::test]
    async fn configured_default_ttl_applies() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;

        let settings = SharingConfig {
            default_link_ttl_days: Some(7),
            ..SharingConfig::default()
        };
        let service = ShareLinkService::new(pool.clone(), settings);

        let mut request = read_link("p1", None);
        request.permission = None;
        let link = service.issue(request).await.unwrap();
        assert!(link.expires_at.is_some());
        assert!(service.resolve(&link.token).await.unwrap().is_some());
    }
}
