// SQLite-backed report store.
//
// Tables:
// - reports: one row per report, polymorphic over (target_kind, target_id)
//
// The open-report rule lives in a partial unique index, and moderation is a
// conditional update, so both hold under concurrent requests.

use crate::core::reports::{
    ModerationStamp, Report, ReportError, ReportInsert, ReportReason, ReportStatus, ReportStore,
    ReportTargetKind,
};
use crate::infra::database::{decode_time, encode_time};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

const REPORT_COLUMNS: &str = "id, target_kind, target_id, reason, description, status, \
     reporter_id, handled_by, handled_at, response, created_at, updated_at";

pub struct SqliteReportStore {
    pool: Pool<Sqlite>,
}

impl SqliteReportStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), ReportError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                id TEXT PRIMARY KEY,
                target_kind TEXT NOT NULL,
                target_id TEXT NOT NULL,
                reason TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'PENDING',
                reporter_id TEXT NOT NULL,
                handled_by TEXT,
                handled_at TEXT,
                response TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_reports_one_open
                ON reports(reporter_id, target_kind, target_id)
                WHERE status IN ('PENDING', 'UNDER_REVIEW');
            CREATE INDEX IF NOT EXISTS idx_reports_reporter
                ON reports(reporter_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_reports_status
                ON reports(status, created_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }
}

fn storage(e: sqlx::Error) -> ReportError {
    ReportError::StorageError(e.to_string())
}

fn report_from_row(row: &SqliteRow) -> Result<Report, ReportError> {
    let kind: String = row.try_get("target_kind").map_err(storage)?;
    let reason: String = row.try_get("reason").map_err(storage)?;
    let status: String = row.try_get("status").map_err(storage)?;
    let handled_at: Option<String> = row.try_get("handled_at").map_err(storage)?;
    let created_at: String = row.try_get("created_at").map_err(storage)?;
    let updated_at: String = row.try_get("updated_at").map_err(storage)?;

    Ok(Report {
        id: row.try_get("id").map_err(storage)?,
        target_kind: ReportTargetKind::parse(&kind)
            .ok_or_else(|| ReportError::StorageError(format!("unknown target kind {:?}", kind)))?,
        target_id: row.try_get("target_id").map_err(storage)?,
        reason: ReportReason::parse(&reason)
            .ok_or_else(|| ReportError::StorageError(format!("unknown reason {:?}", reason)))?,
        description: row.try_get("description").map_err(storage)?,
        status: ReportStatus::parse(&status)
            .ok_or_else(|| ReportError::StorageError(format!("unknown status {:?}", status)))?,
        reporter_id: row.try_get("reporter_id").map_err(storage)?,
        handled_by: row.try_get("handled_by").map_err(storage)?,
        handled_at: handled_at
            .as_deref()
            .map(decode_time)
            .transpose()
            .map_err(ReportError::StorageError)?,
        response: row.try_get("response").map_err(storage)?,
        created_at: decode_time(&created_at).map_err(ReportError::StorageError)?,
        updated_at: decode_time(&updated_at).map_err(ReportError::StorageError)?,
    })
}

fn reports_from_rows(rows: Vec<SqliteRow>) -> Result<Vec<Report>, ReportError> {
    rows.iter().map(report_from_row).collect()
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn insert(&self, report: &Report) -> Result<ReportInsert, ReportError> {
        let result = sqlx::query(
            r#"
            INSERT INTO reports (id, target_kind, target_id, reason, description, status,
                                 reporter_id, handled_by, handled_at, response,
                                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report.id)
        .bind(report.target_kind.as_str())
        .bind(&report.target_id)
        .bind(report.reason.as_str())
        .bind(&report.description)
        .bind(report.status.as_str())
        .bind(&report.reporter_id)
        .bind(&report.handled_by)
        .bind(report.handled_at.as_ref().map(encode_time))
        .bind(&report.response)
        .bind(encode_time(&report.created_at))
        .bind(encode_time(&report.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(ReportInsert::Created),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(ReportInsert::DuplicateOpen)
            }
            Err(e) => Err(storage(e)),
        }
    }

    async fn get(&self, report_id: &str) -> Result<Option<Report>, ReportError> {
        let row = sqlx::query(&format!("SELECT {} FROM reports WHERE id = ?", REPORT_COLUMNS))
            .bind(report_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        row.as_ref().map(report_from_row).transpose()
    }

    async fn list_by_reporter(&self, reporter_id: &str) -> Result<Vec<Report>, ReportError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM reports WHERE reporter_id = ? ORDER BY created_at DESC, rowid DESC",
            REPORT_COLUMNS
        ))
        .bind(reporter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        reports_from_rows(rows)
    }

    async fn list(&self, status: Option<ReportStatus>) -> Result<Vec<Report>, ReportError> {
        let status = status.map(|s| s.as_str());
        let rows = sqlx::query(&format!(
            "SELECT {} FROM reports WHERE (? IS NULL OR status = ?) \
             ORDER BY created_at DESC, rowid DESC",
            REPORT_COLUMNS
        ))
        .bind(status)
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        reports_from_rows(rows)
    }

    async fn apply_moderation(
        &self,
        report_id: &str,
        stamp: &ModerationStamp,
    ) -> Result<Option<Report>, ReportError> {
        let handled_at = encode_time(&stamp.handled_at);
        let row = sqlx::query(&format!(
            r#"
            UPDATE reports
            SET status = ?, handled_by = ?, handled_at = ?,
                response = COALESCE(?, response), updated_at = ?
            WHERE id = ? AND status IN ('PENDING', 'UNDER_REVIEW')
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(stamp.status.as_str())
        .bind(&stamp.handled_by)
        .bind(&handled_at)
        .bind(&stamp.response)
        .bind(&handled_at)
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(report_from_row).transpose()
    }

    async fn delete(&self, report_id: &str) -> Result<bool, ReportError> {
        let result = sqlx::query("DELETE FROM reports WHERE id = ?")
            .bind(report_id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_pending(
        &self,
        report_id: &str,
        reporter_id: &str,
    ) -> Result<bool, ReportError> {
        let result = sqlx::query(
            "DELETE FROM reports WHERE id = ? AND reporter_id = ? AND status = 'PENDING'",
        )
        .bind(report_id)
        .bind(reporter_id)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::database::memory_pool;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    async fn store() -> SqliteReportStore {
        let store = SqliteReportStore::new(memory_pool().await);
        store.migrate().await.unwrap();
        store
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn report(id: &str, reporter: &str, target: &str, minutes: i64) -> Report {
        Report {
            id: id.into(),
            target_kind: ReportTargetKind::User,
            target_id: target.into(),
            reason: ReportReason::Spam,
            description: Some("spam links".into()),
            status: ReportStatus::Pending,
            reporter_id: reporter.into(),
            handled_by: None,
            handled_at: None,
            response: None,
            created_at: at(minutes),
            updated_at: at(minutes),
        }
    }

    fn stamp(status: ReportStatus, response: Option<&str>) -> ModerationStamp {
        ModerationStamp {
            status,
            handled_by: "mod".into(),
            handled_at: at(60),
            response: response.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let store = store().await;
        let original = report("r1", "alice", "bob", 0);

        assert_eq!(store.insert(&original).await.unwrap(), ReportInsert::Created);

        assert_eq!(store.get("r1").await.unwrap(), Some(original));
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_second_open_report_is_rejected_by_the_index() {
        let store = store().await;
        store.insert(&report("r1", "alice", "bob", 0)).await.unwrap();

        let outcome = store.insert(&report("r2", "alice", "bob", 1)).await.unwrap();
        assert_eq!(outcome, ReportInsert::DuplicateOpen);

        // Different target kind with the same id is a different target
        let mut other_kind = report("r3", "alice", "bob", 2);
        other_kind.target_kind = ReportTargetKind::Server;
        assert_eq!(store.insert(&other_kind).await.unwrap(), ReportInsert::Created);
    }

    #[tokio::test]
    async fn test_closed_report_frees_the_slot() {
        let store = store().await;
        store.insert(&report("r1", "alice", "bob", 0)).await.unwrap();
        store
            .apply_moderation("r1", &stamp(ReportStatus::Dismissed, None))
            .await
            .unwrap()
            .unwrap();

        let outcome = store.insert(&report("r2", "alice", "bob", 1)).await.unwrap();

        assert_eq!(outcome, ReportInsert::Created);
    }

    #[tokio::test]
    async fn test_lists_are_newest_first() {
        let store = store().await;
        store.insert(&report("old", "alice", "bob", 0)).await.unwrap();
        store.insert(&report("new", "alice", "carol", 5)).await.unwrap();
        store.insert(&report("other", "dave", "bob", 3)).await.unwrap();

        let mine: Vec<String> = store
            .list_by_reporter("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(mine, vec!["new", "old"]);

        let all: Vec<String> = store
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(all, vec!["new", "other", "old"]);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let store = store().await;
        store.insert(&report("r1", "alice", "bob", 0)).await.unwrap();
        store.insert(&report("r2", "alice", "carol", 1)).await.unwrap();
        store
            .apply_moderation("r1", &stamp(ReportStatus::Resolved, Some("banned")))
            .await
            .unwrap();

        let resolved = store.list(Some(ReportStatus::Resolved)).await.unwrap();
        let pending = store.list(Some(ReportStatus::Pending)).await.unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "r1");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "r2");
    }

    #[tokio::test]
    async fn test_moderation_only_applies_to_open_reports() {
        let store = store().await;
        store.insert(&report("r1", "alice", "bob", 0)).await.unwrap();

        let reviewed = store
            .apply_moderation("r1", &stamp(ReportStatus::UnderReview, Some("looking")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reviewed.status, ReportStatus::UnderReview);
        assert_eq!(reviewed.handled_by.as_deref(), Some("mod"));
        assert_eq!(reviewed.handled_at, Some(at(60)));
        assert_eq!(reviewed.updated_at, at(60));

        // No response given: the earlier one is kept
        let resolved = store
            .apply_moderation("r1", &stamp(ReportStatus::Resolved, None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.response.as_deref(), Some("looking"));

        let again = store
            .apply_moderation("r1", &stamp(ReportStatus::UnderReview, None))
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(
            store.get("r1").await.unwrap().unwrap().status,
            ReportStatus::Resolved
        );

        assert!(store
            .apply_moderation("missing", &stamp(ReportStatus::Resolved, None))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_pending_checks_owner_and_status() {
        let store = store().await;
        store.insert(&report("r1", "alice", "bob", 0)).await.unwrap();
        store.insert(&report("r2", "alice", "carol", 1)).await.unwrap();
        store
            .apply_moderation("r2", &stamp(ReportStatus::UnderReview, None))
            .await
            .unwrap();

        assert!(!store.delete_pending("r1", "mallory").await.unwrap());
        assert!(!store.delete_pending("r2", "alice").await.unwrap());
        assert!(store.delete_pending("r1", "alice").await.unwrap());
        assert!(store.get("r1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store().await;
        store.insert(&report("r1", "alice", "bob", 0)).await.unwrap();

        assert!(store.delete("r1").await.unwrap());
        assert!(!store.delete("r1").await.unwrap());
    }
}
