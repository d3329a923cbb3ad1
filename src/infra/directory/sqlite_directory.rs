// SQLite-backed user directory.
//
// Tables (owned by the auth service and the marketplace; created here only
// if missing so a fresh database works):
// - users
// - resources, resource_versions, resource_comments
// - showcase_posts, showcase_comments
// - servers

use crate::core::directory::{
    DirectoryError, ReportTarget, UserContact, UserDirectory, UserRole, UserSummary,
};
use crate::core::reports::ReportTargetKind;
use crate::infra::database::decode_time;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

#[derive(Clone)]
pub struct SqliteDirectory {
    pool: Pool<Sqlite>,
}

impl SqliteDirectory {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                display_name TEXT,
                email TEXT,
                image TEXT,
                role TEXT NOT NULL DEFAULT 'USER',
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resources (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                owner_user_id TEXT
            );
            CREATE TABLE IF NOT EXISTS resource_versions (
                id TEXT PRIMARY KEY,
                resource_id TEXT NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
                version_number TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS resource_comments (
                id TEXT PRIMARY KEY,
                resource_id TEXT NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                content TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS showcase_posts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author_id TEXT NOT NULL,
                owner_user_id TEXT
            );
            CREATE TABLE IF NOT EXISTS showcase_comments (
                id TEXT PRIMARY KEY,
                post_id TEXT NOT NULL REFERENCES showcase_posts(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                content TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS servers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                owner_user_id TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    /// Seed a user row. The API never creates users itself.
    #[cfg(test)]
    pub async fn insert_user(&self, id: &str, role: UserRole) {
        sqlx::query(
            "INSERT INTO users (id, username, email, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(format!("{}_name", id))
        .bind(format!("{}@example.com", id))
        .bind(role.as_str())
        .bind(crate::infra::database::encode_time(&chrono::Utc::now()))
        .execute(&self.pool)
        .await
        .expect("seed user");
    }

    /// Run raw seed SQL for content tables.
    #[cfg(test)]
    pub async fn seed(&self, sql: &str) {
        sqlx::query(sql).execute(&self.pool).await.expect("seed content");
    }
}

fn storage(e: sqlx::Error) -> DirectoryError {
    DirectoryError::StorageError(e.to_string())
}

fn target_query(kind: ReportTargetKind) -> &'static str {
    match kind {
        ReportTargetKind::User => {
            "SELECT id, id AS owner_id, username AS label, NULL AS slug FROM users WHERE id = ?"
        }
        ReportTargetKind::Resource => {
            "SELECT id, owner_user_id AS owner_id, name AS label, slug FROM resources WHERE id = ?"
        }
        ReportTargetKind::ResourceVersion => {
            r#"
            SELECT v.id AS id, r.owner_user_id AS owner_id, v.version_number AS label,
                   r.slug AS slug
            FROM resource_versions v
            LEFT JOIN resources r ON r.id = v.resource_id
            WHERE v.id = ?
            "#
        }
        ReportTargetKind::ResourceComment => {
            "SELECT id, user_id AS owner_id, content AS label, NULL AS slug FROM resource_comments WHERE id = ?"
        }
        ReportTargetKind::ShowcasePost => {
            r#"
            SELECT id, COALESCE(owner_user_id, author_id) AS owner_id, title AS label,
                   NULL AS slug
            FROM showcase_posts
            WHERE id = ?
            "#
        }
        ReportTargetKind::ShowcasePostComment => {
            "SELECT id, user_id AS owner_id, content AS label, NULL AS slug FROM showcase_comments WHERE id = ?"
        }
        ReportTargetKind::Server => {
            "SELECT id, owner_user_id AS owner_id, name AS label, slug FROM servers WHERE id = ?"
        }
    }
}

fn summary_from_row(row: &SqliteRow) -> Result<UserSummary, sqlx::Error> {
    Ok(UserSummary {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        image: row.try_get("image")?,
    })
}

#[async_trait]
impl UserDirectory for SqliteDirectory {
    async fn role_of(&self, user_id: &str) -> Result<Option<UserRole>, DirectoryError> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        match role {
            None => Ok(None),
            Some(raw) => UserRole::parse(&raw).map(Some).ok_or_else(|| {
                DirectoryError::StorageError(format!("unknown role {:?} for user {}", raw, user_id))
            }),
        }
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserSummary>, DirectoryError> {
        let row = sqlx::query("SELECT id, username, display_name, image FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        row.map(|r| summary_from_row(&r).map_err(storage))
            .transpose()
    }

    async fn find_contact(&self, user_id: &str) -> Result<Option<UserContact>, DirectoryError> {
        let row = sqlx::query(
            "SELECT id, username, display_name, image, email, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let summary = summary_from_row(&row).map_err(storage)?;
        let email: Option<String> = row.try_get("email").map_err(storage)?;
        let created_at: String = row.try_get("created_at").map_err(storage)?;

        Ok(Some(UserContact {
            summary,
            email,
            created_at: decode_time(&created_at).map_err(DirectoryError::StorageError)?,
        }))
    }

    async fn find_target(
        &self,
        kind: ReportTargetKind,
        target_id: &str,
    ) -> Result<Option<ReportTarget>, DirectoryError> {
        let row = sqlx::query(target_query(kind))
            .bind(target_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ReportTarget {
            kind,
            id: row.try_get("id").map_err(storage)?,
            owner_id: row.try_get("owner_id").map_err(storage)?,
            label: row.try_get("label").map_err(storage)?,
            slug: row.try_get("slug").map_err(storage)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::has_role;
    use crate::infra::database::memory_pool;

    async fn directory() -> SqliteDirectory {
        let directory = SqliteDirectory::new(memory_pool().await);
        directory.migrate().await.unwrap();
        directory
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let directory = directory().await;
        directory.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn test_roles_come_from_the_users_table() {
        let directory = directory().await;
        directory.insert_user("m1", UserRole::Moderator).await;

        assert_eq!(directory.role_of("m1").await.unwrap(), Some(UserRole::Moderator));
        assert_eq!(directory.role_of("ghost").await.unwrap(), None);
        assert!(has_role(&directory, "m1", UserRole::Moderator).await.unwrap());
        assert!(!has_role(&directory, "m1", UserRole::Admin).await.unwrap());
        assert!(!has_role(&directory, "ghost", UserRole::User).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_projections() {
        let directory = directory().await;
        directory.insert_user("u1", UserRole::User).await;

        let summary = directory.find_user("u1").await.unwrap().unwrap();
        assert_eq!(summary.username, "u1_name");
        assert!(summary.display_name.is_none());

        let contact = directory.find_contact("u1").await.unwrap().unwrap();
        assert_eq!(contact.email.as_deref(), Some("u1@example.com"));
        assert!(directory.find_contact("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolves_every_target_kind() {
        let directory = directory().await;
        directory.insert_user("u1", UserRole::User).await;
        directory
            .seed(
                r#"
                INSERT INTO resources VALUES ('r1', 'Better Trees', 'better-trees', 'u1');
                INSERT INTO resource_versions VALUES ('v1', 'r1', '1.2.0');
                INSERT INTO resource_comments VALUES ('rc1', 'r1', 'u2', 'nice');
                INSERT INTO showcase_posts VALUES ('p1', 'My base', 'u3', NULL);
                INSERT INTO showcase_comments VALUES ('pc1', 'p1', 'u4', 'cool');
                INSERT INTO servers VALUES ('s1', 'Hub', 'hub', 'u5');
                "#,
            )
            .await;

        let expect = [
            (ReportTargetKind::User, "u1", "u1", "u1_name"),
            (ReportTargetKind::Resource, "r1", "u1", "Better Trees"),
            (ReportTargetKind::ResourceVersion, "v1", "u1", "1.2.0"),
            (ReportTargetKind::ResourceComment, "rc1", "u2", "nice"),
            (ReportTargetKind::ShowcasePost, "p1", "u3", "My base"),
            (ReportTargetKind::ShowcasePostComment, "pc1", "u4", "cool"),
            (ReportTargetKind::Server, "s1", "u5", "Hub"),
        ];

        for (kind, id, owner, label) in expect {
            let target = directory.find_target(kind, id).await.unwrap().unwrap();
            assert_eq!(target.kind, kind);
            assert_eq!(target.owner_id.as_deref(), Some(owner), "{:?}", kind);
            assert_eq!(target.label, label);
        }

        let server = directory
            .find_target(ReportTargetKind::Server, "s1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(server.slug.as_deref(), Some("hub"));
    }

    #[tokio::test]
    async fn test_missing_target_is_none() {
        let directory = directory().await;

        for kind in ReportTargetKind::ALL {
            assert!(directory.find_target(kind, "nope").await.unwrap().is_none());
        }
    }
}
