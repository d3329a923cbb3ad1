// Report service - core business logic for user reports and moderation.
//
// This service handles:
// - Report submission against users and content (with self/duplicate checks)
// - A reporter's own view of their reports (list, detail, cancel)
// - The moderation queue (list, detail, decide, delete)
//
// NO HTTP dependencies here - callers pass plain user ids.

use super::report_models::{
    Acknowledgement, ModeratedReport, ModerationDecision, ModerationReport, ModerationStamp,
    NewReport, OwnReport, Report, ReportInsert, ReportReason, ReportStatus, ReportTargetKind,
    SubmittedReport,
};
use crate::core::directory::{has_role, DirectoryError, UserDirectory, UserRole};
use crate::core::ids::new_id;
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<DirectoryError> for ReportError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::StorageError(msg) => ReportError::StorageError(msg),
        }
    }
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting reports.
///
/// Implementations must make `insert` and `apply_moderation` atomic with
/// respect to the open-report rules: at most one open report per
/// (reporter, target), and terminal reports are never updated.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, report: &Report) -> Result<ReportInsert, ReportError>;

    async fn get(&self, report_id: &str) -> Result<Option<Report>, ReportError>;

    /// All reports filed by a user, newest first.
    async fn list_by_reporter(&self, reporter_id: &str) -> Result<Vec<Report>, ReportError>;

    /// All reports, optionally filtered by status, newest first.
    async fn list(&self, status: Option<ReportStatus>) -> Result<Vec<Report>, ReportError>;

    /// Stamp a moderation decision onto a report if it is still open.
    /// Returns `None` when the report is missing or already terminal.
    async fn apply_moderation(
        &self,
        report_id: &str,
        stamp: &ModerationStamp,
    ) -> Result<Option<Report>, ReportError>;

    async fn delete(&self, report_id: &str) -> Result<bool, ReportError>;

    /// Delete a report only if it belongs to `reporter_id` and is still PENDING.
    async fn delete_pending(&self, report_id: &str, reporter_id: &str)
        -> Result<bool, ReportError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ReportService<S: ReportStore, D: UserDirectory> {
    store: S,
    directory: D,
}

impl<S: ReportStore, D: UserDirectory> ReportService<S, D> {
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// File a report against a user or a piece of content.
    pub async fn report_target(
        &self,
        reporter_id: &str,
        kind: ReportTargetKind,
        target_id: &str,
        submission: NewReport,
    ) -> Result<SubmittedReport, ReportError> {
        let reporter = self
            .directory
            .find_user(reporter_id)
            .await?
            .ok_or_else(|| ReportError::Forbidden("Your account could not be found".into()))?;

        let target = self
            .directory
            .find_target(kind, target_id)
            .await?
            .ok_or_else(|| ReportError::NotFound(kind.not_found_message().into()))?;

        if target.owner_id.as_deref() == Some(reporter_id) {
            return Err(ReportError::BadRequest(kind.own_content_message().into()));
        }

        let description = submission.description;
        if submission.reason == ReportReason::Other && is_blank(description.as_deref()) {
            return Err(ReportError::BadRequest(
                "Description is required when reason is OTHER".into(),
            ));
        }

        let now = Utc::now();
        let report = Report {
            id: new_id(),
            target_kind: kind,
            target_id: target_id.to_string(),
            reason: submission.reason,
            description,
            status: ReportStatus::Pending,
            reporter_id: reporter_id.to_string(),
            handled_by: None,
            handled_at: None,
            response: None,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert(&report).await? {
            ReportInsert::Created => {}
            ReportInsert::DuplicateOpen => {
                return Err(ReportError::BadRequest(kind.duplicate_message().into()));
            }
        }

        tracing::info!(
            report_id = %report.id,
            reporter_id,
            target_kind = kind.as_str(),
            target_id,
            reason = report.reason.as_str(),
            "Report submitted"
        );

        Ok(SubmittedReport { report, reporter })
    }

    /// File a report against another user.
    pub async fn report_user(
        &self,
        reporter_id: &str,
        user_id: &str,
        submission: NewReport,
    ) -> Result<SubmittedReport, ReportError> {
        self.report_target(reporter_id, ReportTargetKind::User, user_id, submission)
            .await
    }

    // ------------------------------------------------------------------------
    // Reporter views
    // ------------------------------------------------------------------------

    pub async fn get_my_reports(&self, user_id: &str) -> Result<Vec<OwnReport>, ReportError> {
        let reports = self.store.list_by_reporter(user_id).await?;
        let mut views = Vec::with_capacity(reports.len());
        for report in reports {
            let target = self
                .directory
                .find_target(report.target_kind, &report.target_id)
                .await?;
            views.push(OwnReport::new(report, target));
        }
        Ok(views)
    }

    pub async fn get_my_report(
        &self,
        user_id: &str,
        report_id: &str,
    ) -> Result<OwnReport, ReportError> {
        let report = self.find_report(report_id).await?;
        if report.reporter_id != user_id {
            return Err(ReportError::Forbidden(
                "You do not have permission to view this report".into(),
            ));
        }

        let target = self
            .directory
            .find_target(report.target_kind, &report.target_id)
            .await?;
        Ok(OwnReport::new(report, target))
    }

    /// Withdraw a report that nobody has looked at yet.
    pub async fn cancel_report(
        &self,
        user_id: &str,
        report_id: &str,
    ) -> Result<Acknowledgement, ReportError> {
        let report = self.find_report(report_id).await?;
        if report.reporter_id != user_id {
            return Err(ReportError::Forbidden(
                "You do not have permission to cancel this report".into(),
            ));
        }
        if report.status != ReportStatus::Pending {
            return Err(ReportError::BadRequest(
                "Only pending reports can be canceled".into(),
            ));
        }

        // A moderator may have picked it up since we read it
        if !self.store.delete_pending(report_id, user_id).await? {
            return Err(ReportError::BadRequest(
                "Only pending reports can be canceled".into(),
            ));
        }

        tracing::info!(report_id, reporter_id = user_id, "Report canceled");
        Ok(Acknowledgement::new("Report canceled successfully"))
    }

    // ------------------------------------------------------------------------
    // Moderation
    // ------------------------------------------------------------------------

    pub async fn get_all_reports(
        &self,
        moderator_id: &str,
        status: Option<ReportStatus>,
    ) -> Result<Vec<ModerationReport>, ReportError> {
        self.require_role(
            moderator_id,
            UserRole::Moderator,
            "You do not have permission to view reports",
        )
        .await?;

        let reports = self.store.list(status).await?;
        let mut views = Vec::with_capacity(reports.len());
        for report in reports {
            views.push(self.moderation_view(report).await?);
        }
        Ok(views)
    }

    pub async fn get_report_by_id(
        &self,
        moderator_id: &str,
        report_id: &str,
    ) -> Result<ModerationReport, ReportError> {
        self.require_role(
            moderator_id,
            UserRole::Moderator,
            "You do not have permission to view this report",
        )
        .await?;

        let report = self.find_report(report_id).await?;
        self.moderation_view(report).await
    }

    /// Apply a moderation decision. Terminal reports cannot be changed.
    pub async fn moderate_report(
        &self,
        moderator_id: &str,
        report_id: &str,
        decision: ModerationDecision,
    ) -> Result<ModeratedReport, ReportError> {
        self.require_role(
            moderator_id,
            UserRole::Moderator,
            "You do not have permission to moderate reports",
        )
        .await?;

        let report = self.find_report(report_id).await?;
        if report.status.is_terminal() {
            return Err(already_handled());
        }

        let stamp = ModerationStamp {
            status: decision.action.resulting_status(),
            handled_by: moderator_id.to_string(),
            handled_at: Utc::now(),
            response: decision.response,
        };

        let updated = match self.store.apply_moderation(report_id, &stamp).await? {
            Some(updated) => updated,
            None => {
                tracing::warn!(
                    report_id,
                    moderator_id,
                    "Report was closed by someone else before this decision landed"
                );
                return Err(already_handled());
            }
        };

        tracing::info!(
            report_id,
            moderator_id,
            from = %report.status,
            to = %updated.status,
            "Report moderated"
        );

        let reporter = self.directory.find_user(&updated.reporter_id).await?;
        let handler = self.directory.find_user(moderator_id).await?;
        Ok(ModeratedReport {
            report: updated,
            reporter,
            handler,
        })
    }

    /// Hard delete a report. Admin only.
    pub async fn delete_report(
        &self,
        admin_id: &str,
        report_id: &str,
    ) -> Result<Acknowledgement, ReportError> {
        self.require_role(
            admin_id,
            UserRole::Admin,
            "You do not have permission to delete reports",
        )
        .await?;

        if !self.store.delete(report_id).await? {
            return Err(report_not_found());
        }

        tracing::info!(report_id, admin_id, "Report deleted");
        Ok(Acknowledgement::new("Report deleted successfully"))
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    async fn find_report(&self, report_id: &str) -> Result<Report, ReportError> {
        self.store
            .get(report_id)
            .await?
            .ok_or_else(report_not_found)
    }

    async fn require_role(
        &self,
        user_id: &str,
        minimum: UserRole,
        message: &str,
    ) -> Result<(), ReportError> {
        if has_role(&self.directory, user_id, minimum).await? {
            Ok(())
        } else {
            Err(ReportError::Forbidden(message.to_string()))
        }
    }

    async fn moderation_view(&self, report: Report) -> Result<ModerationReport, ReportError> {
        let reporter = self.directory.find_contact(&report.reporter_id).await?;
        let handler = match &report.handled_by {
            Some(handler_id) => self.directory.find_user(handler_id).await?,
            None => None,
        };
        let target = self
            .directory
            .find_target(report.target_kind, &report.target_id)
            .await?;

        Ok(ModerationReport {
            report,
            reporter,
            handler,
            target,
        })
    }
}

fn report_not_found() -> ReportError {
    ReportError::NotFound("Report not found".into())
}

fn already_handled() -> ReportError {
    ReportError::BadRequest("This report has already been handled".into())
}

/// Missing or empty. Whitespace counts as text and is stored as sent.
fn is_blank(text: Option<&str>) -> bool {
    text.map_or(true, str::is_empty)
}

// ============================================================================
// TESTS
// ============================================================================
