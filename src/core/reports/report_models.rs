// Report domain models.
//
// These are pure domain types. The HTTP layer serializes them directly, so
// field names follow the camelCase wire format the web frontend expects.

use crate::core::directory::{ReportTarget, UserContact, UserSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of thing a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportTargetKind {
    User,
    Resource,
    ResourceVersion,
    ResourceComment,
    ShowcasePost,
    ShowcasePostComment,
    Server,
}

impl ReportTargetKind {
    pub const ALL: [ReportTargetKind; 7] = [
        ReportTargetKind::User,
        ReportTargetKind::Resource,
        ReportTargetKind::ResourceVersion,
        ReportTargetKind::ResourceComment,
        ReportTargetKind::ShowcasePost,
        ReportTargetKind::ShowcasePostComment,
        ReportTargetKind::Server,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportTargetKind::User => "USER",
            ReportTargetKind::Resource => "RESOURCE",
            ReportTargetKind::ResourceVersion => "RESOURCE_VERSION",
            ReportTargetKind::ResourceComment => "RESOURCE_COMMENT",
            ReportTargetKind::ShowcasePost => "SHOWCASE_POST",
            ReportTargetKind::ShowcasePostComment => "SHOWCASE_POST_COMMENT",
            ReportTargetKind::Server => "SERVER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub fn not_found_message(&self) -> &'static str {
        match self {
            ReportTargetKind::User => "User not found",
            ReportTargetKind::Resource => "Resource not found",
            ReportTargetKind::ResourceVersion => "Resource version not found",
            ReportTargetKind::ResourceComment | ReportTargetKind::ShowcasePostComment => {
                "Comment not found"
            }
            ReportTargetKind::ShowcasePost => "Showcase post not found",
            ReportTargetKind::Server => "Server not found",
        }
    }

    pub fn own_content_message(&self) -> &'static str {
        match self {
            ReportTargetKind::User => "You cannot report yourself",
            ReportTargetKind::Resource => "You cannot report your own resource",
            ReportTargetKind::ResourceVersion => "You cannot report your own resource version",
            ReportTargetKind::ResourceComment | ReportTargetKind::ShowcasePostComment => {
                "You cannot report your own comment"
            }
            ReportTargetKind::ShowcasePost => "You cannot report your own showcase post",
            ReportTargetKind::Server => "You cannot report your own server",
        }
    }

    pub fn duplicate_message(&self) -> &'static str {
        match self {
            ReportTargetKind::User => "You have already reported this user",
            ReportTargetKind::Resource => "You have already reported this resource",
            ReportTargetKind::ResourceVersion => "You have already reported this version",
            ReportTargetKind::ResourceComment | ReportTargetKind::ShowcasePostComment => {
                "You have already reported this comment"
            }
            ReportTargetKind::ShowcasePost => "You have already reported this showcase post",
            ReportTargetKind::Server => "You have already reported this server",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportReason {
    Spam,
    ReuploadedWork,
    Inappropriate,
    Malicious,
    NameSquatting,
    PoorDescription,
    InvalidMetadata,
    Harassment,
    Impersonation,
    Other,
}

impl ReportReason {
    const ALL: [ReportReason; 10] = [
        ReportReason::Spam,
        ReportReason::ReuploadedWork,
        ReportReason::Inappropriate,
        ReportReason::Malicious,
        ReportReason::NameSquatting,
        ReportReason::PoorDescription,
        ReportReason::InvalidMetadata,
        ReportReason::Harassment,
        ReportReason::Impersonation,
        ReportReason::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportReason::Spam => "SPAM",
            ReportReason::ReuploadedWork => "REUPLOADED_WORK",
            ReportReason::Inappropriate => "INAPPROPRIATE",
            ReportReason::Malicious => "MALICIOUS",
            ReportReason::NameSquatting => "NAME_SQUATTING",
            ReportReason::PoorDescription => "POOR_DESCRIPTION",
            ReportReason::InvalidMetadata => "INVALID_METADATA",
            ReportReason::Harassment => "HARASSMENT",
            ReportReason::Impersonation => "IMPERSONATION",
            ReportReason::Other => "OTHER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| reason.as_str() == value)
    }
}

/// Report lifecycle. PENDING and UNDER_REVIEW are "open"; the rest are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    UnderReview,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::UnderReview => "UNDER_REVIEW",
            ReportStatus::Resolved => "RESOLVED",
            ReportStatus::Dismissed => "DISMISSED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(ReportStatus::Pending),
            "UNDER_REVIEW" => Some(ReportStatus::UnderReview),
            "RESOLVED" => Some(ReportStatus::Resolved),
            "DISMISSED" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ReportStatus::Pending | ReportStatus::UnderReview)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a moderator decided to do with a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationAction {
    Dismiss,
    Resolve,
    UnderReview,
}

impl ModerationAction {
    pub fn resulting_status(&self) -> ReportStatus {
        match self {
            ModerationAction::Dismiss => ReportStatus::Dismissed,
            ModerationAction::Resolve => ReportStatus::Resolved,
            ModerationAction::UnderReview => ReportStatus::UnderReview,
        }
    }
}

/// A stored report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[serde(rename = "resourceType")]
    pub target_kind: ReportTargetKind,
    #[serde(rename = "resourceId")]
    pub target_id: String,
    pub reason: ReportReason,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub reporter_id: String,
    pub handled_by: Option<String>,
    pub handled_at: Option<DateTime<Utc>>,
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a report submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub reason: ReportReason,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of a moderation decision.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationDecision {
    pub action: ModerationAction,
    #[serde(default)]
    pub response: Option<String>,
}

/// Fields stamped onto a report when a moderator acts on it.
#[derive(Debug, Clone)]
pub struct ModerationStamp {
    pub status: ReportStatus,
    pub handled_by: String,
    pub handled_at: DateTime<Utc>,
    pub response: Option<String>,
}

/// Result of trying to store a new report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportInsert {
    Created,
    /// The reporter already has an open report against the same target.
    DuplicateOpen,
}

/// A freshly submitted report, echoed back with the reporter's profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedReport {
    #[serde(flatten)]
    pub report: Report,
    pub reporter: UserSummary,
}

/// A report as its reporter sees it. Handler identity is internal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnReport {
    pub id: String,
    pub resource_type: ReportTargetKind,
    pub resource_id: String,
    pub reason: ReportReason,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub handled_at: Option<DateTime<Utc>>,
    pub response: Option<String>,
    pub target: Option<ReportTarget>,
}

impl OwnReport {
    pub fn new(report: Report, target: Option<ReportTarget>) -> Self {
        Self {
            id: report.id,
            resource_type: report.target_kind,
            resource_id: report.target_id,
            reason: report.reason,
            description: report.description,
            status: report.status,
            created_at: report.created_at,
            updated_at: report.updated_at,
            handled_at: report.handled_at,
            response: report.response,
            target,
        }
    }
}

/// A report as moderators see it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationReport {
    #[serde(flatten)]
    pub report: Report,
    pub reporter: Option<UserContact>,
    pub handler: Option<UserSummary>,
    pub target: Option<ReportTarget>,
}

/// The result of a moderation decision. Reporter contact data stays in the queue views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratedReport {
    #[serde(flatten)]
    pub report: Report,
    pub reporter: Option<UserSummary>,
    pub handler: Option<UserSummary>,
}

/// Plain confirmation payload for deletions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_maps_to_status() {
        assert_eq!(
            ModerationAction::Dismiss.resulting_status(),
            ReportStatus::Dismissed
        );
        assert_eq!(
            ModerationAction::Resolve.resulting_status(),
            ReportStatus::Resolved
        );
        assert_eq!(
            ModerationAction::UnderReview.resulting_status(),
            ReportStatus::UnderReview
        );
    }

    #[test]
    fn test_open_and_terminal_statuses() {
        assert!(ReportStatus::Pending.is_open());
        assert!(ReportStatus::UnderReview.is_open());
        assert!(ReportStatus::Resolved.is_terminal());
        assert!(ReportStatus::Dismissed.is_terminal());
    }

    #[test]
    fn test_wire_names_match_serde() {
        for kind in ReportTargetKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(ReportTargetKind::parse(kind.as_str()), Some(kind));
        }
        for reason in ReportReason::ALL {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.as_str()));
        }
        assert_eq!(ReportStatus::parse("UNDER_REVIEW"), Some(ReportStatus::UnderReview));
        assert_eq!(ReportStatus::parse("under_review"), None);
    }

    #[test]
    fn test_new_report_description_is_optional() {
        let body: NewReport = serde_json::from_str(r#"{"reason":"SPAM"}"#).unwrap();
        assert_eq!(body.reason, ReportReason::Spam);
        assert!(body.description.is_none());
    }
}
