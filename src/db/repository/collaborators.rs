use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{AddCollaborator, Collaborator, Permission};
use crate::error::{AppError, AppResult};

const COLLABORATOR_COLUMNS: &str = r#"
    id,
    prompt_id,
    user_id,
    user_name,
    email,
    permission,
    added_at,
    last_active_at,
    is_active
"#;

// ============================================================================
// Collaborator Repository
// ============================================================================

pub struct CollaboratorRepository;

impl CollaboratorRepository {
    /// Insert a collaborator, or update the existing `(prompt_id, user_id)`
    /// row. Re-adding reactivates a soft-deleted row and refreshes the
    /// grant, keeping the original `added_at`; there is never a second row
    /// for the same user.
    pub async fn upsert(pool: &SqlitePool, add: AddCollaborator) -> AppResult<Collaborator> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let sql = format!(
            r#"
            INSERT INTO collaborators (
                id, prompt_id, user_id, user_name, email, permission,
                added_at, last_active_at, is_active
            ) VALUES (?, ?, ?, ?, ?, ?, ?, NULL, 1)
            ON CONFLICT (prompt_id, user_id) DO UPDATE SET
                user_name = excluded.user_name,
                email = excluded.email,
                permission = excluded.permission,
                is_active = 1
            RETURNING {COLLABORATOR_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Collaborator>(&sql)
            .bind(id)
            .bind(add.prompt_id)
            .bind(add.user_id)
            .bind(add.user_name)
            .bind(add.email)
            .bind(add.permission)
            .bind(now)
            .fetch_one(pool)
            .await
            .map_err(AppError::from_write)
    }

    /// Active collaborators on a prompt, oldest grant first.
    pub async fn list_active(pool: &SqlitePool, prompt_id: &str) -> AppResult<Vec<Collaborator>> {
        let sql = format!(
            r#"
            SELECT {COLLABORATOR_COLUMNS}
            FROM collaborators
            WHERE prompt_id = ? AND is_active = 1
            ORDER BY added_at ASC
            "#
        );

        sqlx::query_as::<_, Collaborator>(&sql)
            .bind(prompt_id)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn find_active(
        pool: &SqlitePool,
        prompt_id: &str,
        user_id: &str,
    ) -> AppResult<Option<Collaborator>> {
        let sql = format!(
            r#"
            SELECT {COLLABORATOR_COLUMNS}
            FROM collaborators
            WHERE prompt_id = ? AND user_id = ? AND is_active = 1
            "#
        );

        sqlx::query_as::<_, Collaborator>(&sql)
            .bind(prompt_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn count_active(pool: &SqlitePool, prompt_id: &str) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM collaborators WHERE prompt_id = ? AND is_active = 1",
        )
        .bind(prompt_id)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Soft delete; the row stays behind for audit continuity.
    pub async fn soft_delete(
        pool: &SqlitePool,
        prompt_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE collaborators
            SET is_active = 0
            WHERE prompt_id = ? AND user_id = ? AND is_active = 1
            "#,
        )
        .bind(prompt_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Change an active collaborator's grant in place.
    pub async fn set_permission(
        pool: &SqlitePool,
        prompt_id: &str,
        user_id: &str,
        permission: Permission,
    ) -> AppResult<Option<Collaborator>> {
        let sql = format!(
            r#"
            UPDATE collaborators
            SET permission = ?
            WHERE prompt_id = ? AND user_id = ? AND is_active = 1
            RETURNING {COLLABORATOR_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Collaborator>(&sql)
            .bind(permission)
            .bind(prompt_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn touch_last_active(
        pool: &SqlitePool,
        prompt_id: &str,
        user_id: &str,
    ) -> AppResult<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE collaborators
            SET last_active_at = ?
            WHERE prompt_id = ? AND user_id = ? AND is_active = 1
            "#,
        )
        .bind(now)
        .bind(prompt_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_prompt, test_pool};

    fn bob(permission: Permission) -> AddCollaborator {
        AddCollaborator {
            prompt_id: "p1".to_string(),
            user_id: "bob".to_string(),
            user_name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            permission,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_per_user() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;

        let first = CollaboratorRepository::upsert(&pool, bob(Permission::Read))
            .await
            .unwrap();
        let second = CollaboratorRepository::upsert(&pool, bob(Permission::Write))
            .await
            .unwrap();

        // One row, latest permission, original grant timestamp.
        assert_eq!(first.id, second.id);
        assert_eq!(second.permission, Permission::Write);
        assert_eq!(second.added_at, first.added_at);

        let all = CollaboratorRepository::list_active(&pool, "p1").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].permission, Permission::Write);
    }

    #[tokio::test]
    async fn soft_delete_and_reactivation() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;

        CollaboratorRepository::upsert(&pool, bob(Permission::Read))
            .await
            .unwrap();
        assert!(CollaboratorRepository::soft_delete(&pool, "p1", "bob")
            .await
            .unwrap());
        assert!(!CollaboratorRepository::soft_delete(&pool, "p1", "bob")
            .await
            .unwrap());
        assert!(CollaboratorRepository::list_active(&pool, "p1")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(CollaboratorRepository::count_active(&pool, "p1").await.unwrap(), 0);

        // Re-adding revives the same row instead of creating a duplicate.
        let revived = CollaboratorRepository::upsert(&pool, bob(Permission::Admin))
            .await
            .unwrap();
        assert!(revived.is_active);
        assert_eq!(revived.permission, Permission::Admin);
        assert_eq!(CollaboratorRepository::count_active(&pool, "p1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_orders_by_added_at() {
        let pool = test_pool().await;
        seed_prompt(&pool, "p1", "alice").await;

        for (user, name) in [("u1", "One"), ("u2", "Two"), ("u3", "Three")] {
            CollaboratorRepository::upsert(
                &pool,
                AddCollaborator {
                    prompt_id: "p1".to_string(),
                    user_id: user.to_string(),
                    user_name: name.to_string(),
                    email: format!("{user}@example.com"),
                    permission: Permission::Read,
                },
            )
            .await
            .unwrap();
        }

        let all = CollaboratorRepository::list_active(&pool, "p1").await.unwrap();
        let ids: Vec<&str> = all.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2", "u3"]);
    }
}
