// In-memory directory shared by the service tests.

use super::directory_models::{ReportTarget, UserContact, UserRole, UserSummary};
use super::directory_store::{DirectoryError, UserDirectory};
use crate::core::reports::ReportTargetKind;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

#[derive(Default)]
pub struct FakeDirectory {
    users: DashMap<String, (UserSummary, UserRole)>,
    targets: DashMap<(ReportTargetKind, String), ReportTarget>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: &str, role: UserRole) -> Self {
        let summary = UserSummary {
            id: id.to_string(),
            username: format!("{}_name", id),
            display_name: None,
            image: None,
        };
        self.users.insert(id.to_string(), (summary, role));
        self
    }

    /// Register non-user content owned by `owner_id`.
    pub fn with_target(self, kind: ReportTargetKind, id: &str, owner_id: &str) -> Self {
        self.targets.insert(
            (kind, id.to_string()),
            ReportTarget {
                kind,
                id: id.to_string(),
                owner_id: Some(owner_id.to_string()),
                label: format!("{} label", id),
                slug: None,
            },
        );
        self
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn role_of(&self, user_id: &str) -> Result<Option<UserRole>, DirectoryError> {
        Ok(self.users.get(user_id).map(|entry| entry.1))
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserSummary>, DirectoryError> {
        Ok(self.users.get(user_id).map(|entry| entry.0.clone()))
    }

    async fn find_contact(&self, user_id: &str) -> Result<Option<UserContact>, DirectoryError> {
        Ok(self.users.get(user_id).map(|entry| UserContact {
            summary: entry.0.clone(),
            email: Some(format!("{}@example.com", user_id)),
            created_at: Utc::now(),
        }))
    }

    async fn find_target(
        &self,
        kind: ReportTargetKind,
        target_id: &str,
    ) -> Result<Option<ReportTarget>, DirectoryError> {
        if kind == ReportTargetKind::User {
            return Ok(self.users.get(target_id).map(|entry| ReportTarget {
                kind,
                id: target_id.to_string(),
                owner_id: Some(target_id.to_string()),
                label: entry.0.username.clone(),
                slug: None,
            }));
        }
        Ok(self
            .targets
            .get(&(kind, target_id.to_string()))
            .map(|t| t.clone()))
    }
}
