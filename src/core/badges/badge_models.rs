// Badge domain models.

use crate::core::directory::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeRarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl BadgeRarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeRarity::Common => "COMMON",
            BadgeRarity::Rare => "RARE",
            BadgeRarity::Epic => "EPIC",
            BadgeRarity::Legendary => "LEGENDARY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "COMMON" => Some(BadgeRarity::Common),
            "RARE" => Some(BadgeRarity::Rare),
            "EPIC" => Some(BadgeRarity::Epic),
            "LEGENDARY" => Some(BadgeRarity::Legendary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub rarity: BadgeRarity,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCounts {
    pub user_badges: i64,
}

/// A badge plus how many users hold it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeWithCount {
    #[serde(flatten)]
    pub badge: Badge,
    #[serde(rename = "_count")]
    pub count: BadgeCounts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBadge {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub rarity: Option<BadgeRarity>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Partial update. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub rarity: Option<BadgeRarity>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// One badge held by one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub user_id: String,
    pub badge_id: String,
    pub awarded_by: String,
    pub awarded_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Response to an award: the grant plus the badge and recipient.
#[derive(Debug, Clone, Serialize)]
pub struct AwardedBadge {
    #[serde(flatten)]
    pub award: UserBadge,
    pub badge: Badge,
    pub user: UserSummary,
}

/// A row of a user's badge shelf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserBadgeEntry {
    #[serde(flatten)]
    pub award: UserBadge,
    pub badge: Badge,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardRequest {
    pub user_id: String,
    pub badge_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeInsert {
    Created,
    SlugTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardInsert {
    Created,
    AlreadyAwarded,
}

/// Outcome of deleting a badge that must not be held by anyone.
#[derive(Debug, Clone, PartialEq)]
pub enum BadgeDeletion {
    Deleted(Badge),
    InUse,
    Missing,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge() -> Badge {
        let now = Utc::now();
        Badge {
            id: "b1".into(),
            name: "Early Adopter".into(),
            slug: "early-adopter".into(),
            description: None,
            icon: None,
            color: Some("#69a024".into()),
            rarity: BadgeRarity::Common,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_count_serializes_like_the_frontend_expects() {
        let json = serde_json::to_value(BadgeWithCount {
            badge: badge(),
            count: BadgeCounts { user_badges: 3 },
        })
        .unwrap();

        assert_eq!(json["_count"]["userBadges"], 3);
        assert_eq!(json["isActive"], true);
        assert_eq!(json["rarity"], "COMMON");
    }

    #[test]
    fn test_new_badge_defaults() {
        let body: NewBadge =
            serde_json::from_str(r#"{"name":"Early Adopter","slug":"early-adopter"}"#).unwrap();

        assert!(body.rarity.is_none());
        assert!(body.is_active.is_none());
        assert_eq!(BadgeRarity::default(), BadgeRarity::Common);
    }

    #[test]
    fn test_rarity_parse() {
        assert_eq!(BadgeRarity::parse("LEGENDARY"), Some(BadgeRarity::Legendary));
        assert_eq!(BadgeRarity::parse("MYTHIC"), None);
    }
}
