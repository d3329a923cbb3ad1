// Badge service - badge catalogue and awards.
//
// Reads are open to everyone. Curating the catalogue needs ADMIN,
// awarding and revoking needs MODERATOR.

use super::badge_models::{
    AwardInsert, AwardRequest, AwardedBadge, Badge, BadgeDeletion, BadgeInsert, BadgeUpdate,
    BadgeWithCount, NewBadge, UserBadge, UserBadgeEntry,
};
use crate::core::directory::{has_role, DirectoryError, UserDirectory, UserRole};
use crate::core::ids::new_id;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum BadgeError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<DirectoryError> for BadgeError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::StorageError(msg) => BadgeError::StorageError(msg),
        }
    }
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait BadgeStore: Send + Sync {
    /// Insert a badge; a slug collision is reported, not raised.
    async fn insert_badge(&self, badge: &Badge) -> Result<BadgeInsert, BadgeError>;

    /// Newest first, optionally filtered by `is_active`.
    async fn list_badges(&self, is_active: Option<bool>) -> Result<Vec<BadgeWithCount>, BadgeError>;

    async fn get_badge(&self, badge_id: &str) -> Result<Option<BadgeWithCount>, BadgeError>;

    async fn get_badge_by_slug(&self, slug: &str) -> Result<Option<BadgeWithCount>, BadgeError>;

    async fn update_badge(
        &self,
        badge_id: &str,
        update: &BadgeUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Badge>, BadgeError>;

    /// Delete a badge only if nobody holds it.
    async fn delete_unused_badge(&self, badge_id: &str) -> Result<BadgeDeletion, BadgeError>;

    async fn insert_award(&self, award: &UserBadge) -> Result<AwardInsert, BadgeError>;

    async fn delete_award(
        &self,
        user_id: &str,
        badge_id: &str,
    ) -> Result<Option<UserBadge>, BadgeError>;

    /// A user's badges, most recently awarded first.
    async fn list_user_badges(&self, user_id: &str) -> Result<Vec<UserBadgeEntry>, BadgeError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct BadgeService<S: BadgeStore, D: UserDirectory> {
    store: S,
    directory: D,
}

impl<S: BadgeStore, D: UserDirectory> BadgeService<S, D> {
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    pub async fn create_badge(&self, actor_id: &str, new_badge: NewBadge) -> Result<Badge, BadgeError> {
        self.require_role(actor_id, UserRole::Admin, "Admin access required")
            .await?;

        let name = new_badge.name.trim();
        let slug = new_badge.slug.trim();
        if name.is_empty() {
            return Err(BadgeError::BadRequest("Badge name is required".into()));
        }
        if slug.is_empty() {
            return Err(BadgeError::BadRequest("Badge slug is required".into()));
        }

        let now = Utc::now();
        let badge = Badge {
            id: new_id(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: new_badge.description,
            icon: new_badge.icon,
            color: new_badge.color,
            rarity: new_badge.rarity.unwrap_or_default(),
            is_active: new_badge.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        match self.store.insert_badge(&badge).await? {
            BadgeInsert::Created => {}
            BadgeInsert::SlugTaken => {
                return Err(BadgeError::Conflict(
                    "Badge with this slug already exists".into(),
                ));
            }
        }

        tracing::info!(badge_id = %badge.id, slug = %badge.slug, actor_id, "Badge created");
        Ok(badge)
    }

    pub async fn list_badges(&self, is_active: Option<bool>) -> Result<Vec<BadgeWithCount>, BadgeError> {
        self.store.list_badges(is_active).await
    }

    pub async fn get_badge(&self, badge_id: &str) -> Result<BadgeWithCount, BadgeError> {
        self.store
            .get_badge(badge_id)
            .await?
            .ok_or_else(badge_not_found)
    }

    pub async fn get_badge_by_slug(&self, slug: &str) -> Result<BadgeWithCount, BadgeError> {
        self.store
            .get_badge_by_slug(slug)
            .await?
            .ok_or_else(badge_not_found)
    }

    pub async fn update_badge(
        &self,
        actor_id: &str,
        badge_id: &str,
        mut update: BadgeUpdate,
    ) -> Result<Badge, BadgeError> {
        self.require_role(actor_id, UserRole::Admin, "Admin access required")
            .await?;

        if let Some(name) = update.name.take() {
            let name = name.trim();
            if name.is_empty() {
                return Err(BadgeError::BadRequest("Badge name cannot be empty".into()));
            }
            update.name = Some(name.to_string());
        }

        let badge = self
            .store
            .update_badge(badge_id, &update, Utc::now())
            .await?
            .ok_or_else(badge_not_found)?;

        tracing::info!(badge_id, actor_id, "Badge updated");
        Ok(badge)
    }

    pub async fn delete_badge(&self, actor_id: &str, badge_id: &str) -> Result<Badge, BadgeError> {
        self.require_role(actor_id, UserRole::Admin, "Admin access required")
            .await?;

        match self.store.delete_unused_badge(badge_id).await? {
            BadgeDeletion::Deleted(badge) => {
                tracing::info!(badge_id, actor_id, "Badge deleted");
                Ok(badge)
            }
            BadgeDeletion::InUse => Err(BadgeError::BadRequest(
                "Cannot delete badge that has been awarded to users".into(),
            )),
            BadgeDeletion::Missing => Err(badge_not_found()),
        }
    }

    pub async fn award_badge(
        &self,
        actor_id: &str,
        request: AwardRequest,
    ) -> Result<AwardedBadge, BadgeError> {
        self.require_role(actor_id, UserRole::Moderator, "Moderator access required")
            .await?;

        let user = self
            .directory
            .find_user(&request.user_id)
            .await?
            .ok_or_else(|| BadgeError::NotFound("User not found".into()))?;

        let badge = self.get_badge(&request.badge_id).await?.badge;
        if !badge.is_active {
            return Err(BadgeError::BadRequest("Cannot award inactive badge".into()));
        }

        let award = UserBadge {
            user_id: request.user_id,
            badge_id: request.badge_id,
            awarded_by: actor_id.to_string(),
            awarded_at: Utc::now(),
            reason: request.reason,
        };

        match self.store.insert_award(&award).await? {
            AwardInsert::Created => {}
            AwardInsert::AlreadyAwarded => {
                return Err(BadgeError::Conflict("User already has this badge".into()));
            }
        }

        tracing::info!(
            badge_id = %award.badge_id,
            user_id = %award.user_id,
            actor_id,
            "Badge awarded"
        );

        Ok(AwardedBadge { award, badge, user })
    }

    pub async fn revoke_badge(
        &self,
        actor_id: &str,
        badge_id: &str,
        user_id: &str,
    ) -> Result<UserBadge, BadgeError> {
        self.require_role(actor_id, UserRole::Moderator, "Moderator access required")
            .await?;

        let removed = self
            .store
            .delete_award(user_id, badge_id)
            .await?
            .ok_or_else(|| BadgeError::NotFound("User does not have this badge".into()))?;

        tracing::info!(badge_id, user_id, actor_id, "Badge revoked");
        Ok(removed)
    }

    pub async fn get_user_badges(&self, user_id: &str) -> Result<Vec<UserBadgeEntry>, BadgeError> {
        self.store.list_user_badges(user_id).await
    }

    async fn require_role(
        &self,
        user_id: &str,
        minimum: UserRole,
        message: &str,
    ) -> Result<(), BadgeError> {
        if has_role(&self.directory, user_id, minimum).await? {
            Ok(())
        } else {
            Err(BadgeError::Forbidden(message.to_string()))
        }
    }
}

fn badge_not_found() -> BadgeError {
    BadgeError::NotFound("Badge not found".into())
}

// ============================================================================
// TESTS
// ============================================================================
