use base64::Engine;
use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{Permission, ShareLink, SharedPrompt};
use crate::error::{AppError, AppResult};

const SHARE_LINK_COLUMNS: &str = r#"
    id,
    prompt_id,
    token,
    permission,
    created_by,
    created_at,
    expires_at,
    max_uses,
    current_uses,
    is_active,
    description,
    last_accessed_at
"#;

// ============================================================================
// Share Link Repository
// ============================================================================

pub struct ShareLinkRepository;

impl ShareLinkRepository {
    /// Generate a URL-safe random token for share links.
    pub fn generate_token() -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let bytes: Vec<u8> = (0..32).map(|_| rng.r#gen()).collect();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    pub async fn create(
        pool: &SqlitePool,
        prompt_id: &str,
        permission: Permission,
        created_by: &str,
        expires_at: Option<NaiveDateTime>,
        max_uses: Option<i64>,
        description: &str,
    ) -> AppResult<ShareLink> {
        let id = Uuid::new_v4().to_string();
        let token = Self::generate_token();
        let now = Utc::now().naive_utc();

        let sql = format!(
            r#"
            INSERT INTO share_links (
                id, prompt_id, token, permission, created_by, created_at,
                expires_at, max_uses, current_uses, is_active, description,
                last_accessed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, 1, ?, NULL)
            RETURNING {SHARE_LINK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ShareLink>(&sql)
            .bind(id)
            .bind(prompt_id)
            .bind(token)
            .bind(permission)
            .bind(created_by)
            .bind(now)
            .bind(expires_at)
            .bind(max_uses)
            .bind(description)
            .fetch_one(pool)
            .await
            .map_err(AppError::from_write)
    }

    /// Fetch a link by token only if it currently grants access. Missing,
    /// revoked, expired and use-exhausted links are all absent here, so a
    /// probing caller learns nothing about which it was.
    pub async fn find_usable(pool: &SqlitePool, token: &str) -> AppResult<Option<ShareLink>> {
        let now = Utc::now().naive_utc();

        let sql = format!(
            r#"
            SELECT {SHARE_LINK_COLUMNS}
            FROM share_links
            WHERE token = ?
              AND is_active = 1
              AND (expires_at IS NULL OR expires_at > ?)
              AND (max_uses IS NULL OR current_uses < max_uses)
            "#
        );

        sqlx::query_as::<_, ShareLink>(&sql)
            .bind(token)
            .bind(now)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)
    }

    /// Record one use of a link, atomically. The usability conditions live in
    /// the UPDATE itself so two concurrent consumers can never both pass a
    /// stale `current_uses` check; the statement that loses the race matches
    /// zero rows and returns `None`.
    pub async fn consume_use(pool: &SqlitePool, token: &str) -> AppResult<Option<ShareLink>> {
        let now = Utc::now().naive_utc();

        let sql = format!(
            r#"
            UPDATE share_links
            SET current_uses = current_uses + 1, last_accessed_at = ?
            WHERE token = ?
              AND is_active = 1
              AND (expires_at IS NULL OR expires_at > ?)
              AND (max_uses IS NULL OR current_uses < max_uses)
            RETURNING {SHARE_LINK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ShareLink>(&sql)
            .bind(now)
            .bind(token)
            .bind(now)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)
    }

    /// Deactivate a link, scoped to its creator. Returns the affected row so
    /// the caller can log against its prompt; `None` when the token does not
    /// belong to `requester` (existence is not confirmed to non-owners).
    pub async fn revoke(
        pool: &SqlitePool,
        token: &str,
        requester: &str,
    ) -> AppResult<Option<ShareLink>> {
        let sql = format!(
            r#"
            UPDATE share_links
            SET is_active = 0
            WHERE token = ? AND created_by = ?
            RETURNING {SHARE_LINK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ShareLink>(&sql)
            .bind(token)
            .bind(requester)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)
    }

    /// All links a creator holds on one prompt, newest first.
    pub async fn list_for_prompt(
        pool: &SqlitePool,
        prompt_id: &str,
        created_by: &str,
    ) -> AppResult<Vec<ShareLink>> {
        let sql = format!(
            r#"
            SELECT {SHARE_LINK_COLUMNS}
            FROM share_links
            WHERE prompt_id = ? AND created_by = ?
            ORDER BY created_at DESC
            "#
        );

        sqlx::query_as::<_, ShareLink>(&sql)
            .bind(prompt_id)
            .bind(created_by)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }

    /// Active share links created by a user, joined with the prompt they
    /// expose. Mapped by named column; the lifecycle status is derived from
    /// the row rather than trusted from storage.
    pub async fn shared_by_user(pool: &SqlitePool, user_id: &str) -> AppResult<Vec<SharedPrompt>> {
        let sql = format!(
            r#"
            SELECT {SHARE_LINK_COLUMNS}, (
                SELECT p.title FROM prompts p WHERE p.id = share_links.prompt_id
            ) AS prompt_title
            FROM share_links
            WHERE created_by = ? AND is_active = 1
            ORDER BY created_at DESC
            "#
        );

        let rows = sqlx::query_as::<_, ShareLinkWithTitle>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)?;

        let now = Utc::now().naive_utc();
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let status = row.link.status(now);
            out.push(SharedPrompt {
                id: row.link.id,
                prompt_id: row.link.prompt_id,
                prompt_title: row.prompt_title.unwrap_or_default(),
                token: row.link.token,
                owner_id: row.link.created_by,
                permission: row.link.permission,
                status,
                created_at: row.link.created_at,
                expires_at: row.link.expires_at,
                access_count: row.link.current_uses,
                last_accessed_at: row.link.last_accessed_at,
                description: row.link.description,
            });
        }

        Ok(out)
    }

    /// Flip links that can no longer grant access (expired or use-exhausted)
    /// to inactive. Purely housekeeping: `find_usable`/`consume_use` check
    /// these conditions lazily, so correctness never depends on this sweep.
    pub async fn deactivate_dead_links(pool: &SqlitePool) -> AppResult<u64> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE share_links
            SET is_active = 0
            WHERE is_active = 1
              AND (
                (expires_at IS NOT NULL AND expires_at <= ?)
                OR (max_uses IS NOT NULL AND current_uses >= max_uses)
              )
            "#,
        )
        .bind(now)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct ShareLinkWithTitle {
    #[sqlx(flatten)]
    link: ShareLink,
    prompt_title: Option<String>,
}
