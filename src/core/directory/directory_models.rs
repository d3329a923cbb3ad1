// Directory domain models - who users are and what can be reported.
//
// Users are owned by the external auth service; this crate only reads them.
// Reportable content (resources, servers, comments, ...) is owned by the
// marketplace, and we only need enough of it to resolve an owner and a label.

use crate::core::reports::ReportTargetKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role tiers, lowest privilege first. The derived `Ord` is the privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Moderator,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::Moderator => "MODERATOR",
            UserRole::Admin => "ADMIN",
            UserRole::SuperAdmin => "SUPER_ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USER" => Some(UserRole::User),
            "MODERATOR" => Some(UserRole::Moderator),
            "ADMIN" => Some(UserRole::Admin),
            "SUPER_ADMIN" => Some(UserRole::SuperAdmin),
            _ => None,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public profile projection of a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// What moderators see about a reporter: the public profile plus contact data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContact {
    #[serde(flatten)]
    pub summary: UserSummary,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A piece of reportable content, resolved from the directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTarget {
    pub kind: ReportTargetKind,
    pub id: String,
    /// Who owns the content. Never serialized; only used to reject
    /// reports against your own content.
    #[serde(skip)]
    pub owner_id: Option<String>,
    /// Display text: username, resource name, version number, comment body...
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_tiers() {
        assert!(UserRole::User < UserRole::Moderator);
        assert!(UserRole::Moderator < UserRole::Admin);
        assert!(UserRole::SuperAdmin >= UserRole::Admin);
        assert!(UserRole::SuperAdmin >= UserRole::Moderator);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse("SUPER_ADMIN"), Some(UserRole::SuperAdmin));
        assert_eq!(UserRole::parse("moderator"), None);
        assert_eq!(UserRole::Moderator.to_string(), "MODERATOR");
    }
}
