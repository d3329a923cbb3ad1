// SQLite-backed badge store.
//
// Tables:
// - badges: the catalogue, slug is unique
// - user_badges: awards, one per (user_id, badge_id)

use crate::core::badges::{
    AwardInsert, Badge, BadgeCounts, BadgeDeletion, BadgeError, BadgeInsert, BadgeRarity,
    BadgeStore, BadgeUpdate, BadgeWithCount, UserBadge, UserBadgeEntry,
};
use crate::infra::database::{decode_time, encode_time};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

const BADGE_COLUMNS: &str =
    "id, name, slug, description, icon, color, rarity, is_active, created_at, updated_at";

const AWARD_COLUMNS: &str = "user_id, badge_id, awarded_by, awarded_at, reason";

pub struct SqliteBadgeStore {
    pool: Pool<Sqlite>,
}

impl SqliteBadgeStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), BadgeError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS badges (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT,
                icon TEXT,
                color TEXT,
                rarity TEXT NOT NULL DEFAULT 'COMMON',
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_badges (
                user_id TEXT NOT NULL,
                badge_id TEXT NOT NULL REFERENCES badges(id),
                awarded_by TEXT NOT NULL,
                awarded_at TEXT NOT NULL,
                reason TEXT,
                PRIMARY KEY (user_id, badge_id)
            );
            CREATE INDEX IF NOT EXISTS idx_user_badges_badge
                ON user_badges(badge_id);
            CREATE INDEX IF NOT EXISTS idx_user_badges_user
                ON user_badges(user_id, awarded_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn fetch_counted(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<BadgeWithCount>, BadgeError> {
        let row = sqlx::query(&format!(
            "SELECT {}, {} FROM badges b WHERE b.{} = ?",
            BADGE_COLUMNS, COUNT_COLUMN, column
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(counted_from_row).transpose()
    }
}

const COUNT_COLUMN: &str =
    "(SELECT COUNT(*) FROM user_badges ub WHERE ub.badge_id = b.id) AS award_count";

fn storage(e: sqlx::Error) -> BadgeError {
    BadgeError::StorageError(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn badge_from_row(row: &SqliteRow) -> Result<Badge, BadgeError> {
    let rarity: String = row.try_get("rarity").map_err(storage)?;
    let created_at: String = row.try_get("created_at").map_err(storage)?;
    let updated_at: String = row.try_get("updated_at").map_err(storage)?;

    Ok(Badge {
        id: row.try_get("id").map_err(storage)?,
        name: row.try_get("name").map_err(storage)?,
        slug: row.try_get("slug").map_err(storage)?,
        description: row.try_get("description").map_err(storage)?,
        icon: row.try_get("icon").map_err(storage)?,
        color: row.try_get("color").map_err(storage)?,
        rarity: BadgeRarity::parse(&rarity)
            .ok_or_else(|| BadgeError::StorageError(format!("unknown rarity {:?}", rarity)))?,
        is_active: row.try_get("is_active").map_err(storage)?,
        created_at: decode_time(&created_at).map_err(BadgeError::StorageError)?,
        updated_at: decode_time(&updated_at).map_err(BadgeError::StorageError)?,
    })
}

fn counted_from_row(row: &SqliteRow) -> Result<BadgeWithCount, BadgeError> {
    Ok(BadgeWithCount {
        badge: badge_from_row(row)?,
        count: BadgeCounts {
            user_badges: row.try_get("award_count").map_err(storage)?,
        },
    })
}

fn award_from_row(row: &SqliteRow) -> Result<UserBadge, BadgeError> {
    let awarded_at: String = row.try_get("awarded_at").map_err(storage)?;

    Ok(UserBadge {
        user_id: row.try_get("user_id").map_err(storage)?,
        badge_id: row.try_get("badge_id").map_err(storage)?,
        awarded_by: row.try_get("awarded_by").map_err(storage)?,
        awarded_at: decode_time(&awarded_at).map_err(BadgeError::StorageError)?,
        reason: row.try_get("reason").map_err(storage)?,
    })
}

#[async_trait]
impl BadgeStore for SqliteBadgeStore {
    async fn insert_badge(&self, badge: &Badge) -> Result<BadgeInsert, BadgeError> {
        let result = sqlx::query(&format!(
            "INSERT INTO badges ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            BADGE_COLUMNS
        ))
        .bind(&badge.id)
        .bind(&badge.name)
        .bind(&badge.slug)
        .bind(&badge.description)
        .bind(&badge.icon)
        .bind(&badge.color)
        .bind(badge.rarity.as_str())
        .bind(badge.is_active)
        .bind(encode_time(&badge.created_at))
        .bind(encode_time(&badge.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(BadgeInsert::Created),
            Err(e) if is_unique_violation(&e) => Ok(BadgeInsert::SlugTaken),
            Err(e) => Err(storage(e)),
        }
    }

    async fn list_badges(&self, is_active: Option<bool>) -> Result<Vec<BadgeWithCount>, BadgeError> {
        let rows = sqlx::query(&format!(
            "SELECT {}, {} FROM badges b WHERE (? IS NULL OR b.is_active = ?) \
             ORDER BY b.created_at DESC, b.rowid DESC",
            BADGE_COLUMNS, COUNT_COLUMN
        ))
        .bind(is_active)
        .bind(is_active)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(counted_from_row).collect()
    }

    async fn get_badge(&self, badge_id: &str) -> Result<Option<BadgeWithCount>, BadgeError> {
        self.fetch_counted("id", badge_id).await
    }

    async fn get_badge_by_slug(&self, slug: &str) -> Result<Option<BadgeWithCount>, BadgeError> {
        self.fetch_counted("slug", slug).await
    }

    async fn update_badge(
        &self,
        badge_id: &str,
        update: &BadgeUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Badge>, BadgeError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE badges
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                icon = COALESCE(?, icon),
                color = COALESCE(?, color),
                rarity = COALESCE(?, rarity),
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            BADGE_COLUMNS
        ))
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.icon)
        .bind(&update.color)
        .bind(update.rarity.map(|r| r.as_str()))
        .bind(update.is_active)
        .bind(encode_time(&updated_at))
        .bind(badge_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(badge_from_row).transpose()
    }

    async fn delete_unused_badge(&self, badge_id: &str) -> Result<BadgeDeletion, BadgeError> {
        let row = sqlx::query(&format!(
            r#"
            DELETE FROM badges
            WHERE id = ?
              AND NOT EXISTS (SELECT 1 FROM user_badges WHERE badge_id = ?)
            RETURNING {}
            "#,
            BADGE_COLUMNS
        ))
        .bind(badge_id)
        .bind(badge_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        if let Some(row) = row {
            return Ok(BadgeDeletion::Deleted(badge_from_row(&row)?));
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM badges WHERE id = ?)")
            .bind(badge_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;

        Ok(if exists {
            BadgeDeletion::InUse
        } else {
            BadgeDeletion::Missing
        })
    }

    async fn insert_award(&self, award: &UserBadge) -> Result<AwardInsert, BadgeError> {
        let result = sqlx::query(&format!(
            "INSERT INTO user_badges ({}) VALUES (?, ?, ?, ?, ?)",
            AWARD_COLUMNS
        ))
        .bind(&award.user_id)
        .bind(&award.badge_id)
        .bind(&award.awarded_by)
        .bind(encode_time(&award.awarded_at))
        .bind(&award.reason)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(AwardInsert::Created),
            Err(e) if is_unique_violation(&e) => Ok(AwardInsert::AlreadyAwarded),
            Err(e) => Err(storage(e)),
        }
    }

    async fn delete_award(
        &self,
        user_id: &str,
        badge_id: &str,
    ) -> Result<Option<UserBadge>, BadgeError> {
        let row = sqlx::query(&format!(
            "DELETE FROM user_badges WHERE user_id = ? AND badge_id = ? RETURNING {}",
            AWARD_COLUMNS
        ))
        .bind(user_id)
        .bind(badge_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(award_from_row).transpose()
    }

    async fn list_user_badges(&self, user_id: &str) -> Result<Vec<UserBadgeEntry>, BadgeError> {
        let rows = sqlx::query(
            r#"
            SELECT ub.user_id, ub.badge_id, ub.awarded_by, ub.awarded_at, ub.reason,
                   b.id, b.name, b.slug, b.description, b.icon, b.color, b.rarity,
                   b.is_active, b.created_at, b.updated_at
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = ?
            ORDER BY ub.awarded_at DESC, ub.rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter()
            .map(|row| -> Result<UserBadgeEntry, BadgeError> {
                Ok(UserBadgeEntry {
                    award: award_from_row(row)?,
                    badge: badge_from_row(row)?,
                })
            })
            .collect()
    }
}
