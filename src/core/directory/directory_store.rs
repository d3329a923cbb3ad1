use super::directory_models::{ReportTarget, UserContact, UserRole, UserSummary};
use crate::core::reports::ReportTargetKind;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Read-only view over users and reportable content.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// The user's current role, or `None` if the user does not exist.
    async fn role_of(&self, user_id: &str) -> Result<Option<UserRole>, DirectoryError>;

    async fn find_user(&self, user_id: &str) -> Result<Option<UserSummary>, DirectoryError>;

    async fn find_contact(&self, user_id: &str) -> Result<Option<UserContact>, DirectoryError>;

    /// Resolve a reportable target by kind and id.
    async fn find_target(
        &self,
        kind: ReportTargetKind,
        target_id: &str,
    ) -> Result<Option<ReportTarget>, DirectoryError>;
}

/// Whether `user_id` exists and holds at least `minimum`.
pub async fn has_role<D: UserDirectory + ?Sized>(
    directory: &D,
    user_id: &str,
    minimum: UserRole,
) -> Result<bool, DirectoryError> {
    Ok(directory
        .role_of(user_id)
        .await?
        .map(|role| role >= minimum)
        .unwrap_or(false))
}
