// Shared application state handed to every handler.

use super::auth::TokenVerifier;
use crate::core::badges::BadgeService;
use crate::core::reports::ReportService;
use crate::infra::badges::SqliteBadgeStore;
use crate::infra::directory::SqliteDirectory;
use crate::infra::reports::SqliteReportStore;
use sqlx::SqlitePool;
use std::sync::Arc;

pub type Reports = ReportService<SqliteReportStore, SqliteDirectory>;
pub type Badges = BadgeService<SqliteBadgeStore, SqliteDirectory>;

#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<Reports>,
    pub badges: Arc<Badges>,
    pub tokens: Arc<TokenVerifier>,
}

impl AppState {
    /// Run every store's migrations against `pool` and wire the services.
    pub async fn bootstrap(pool: SqlitePool, tokens: TokenVerifier) -> anyhow::Result<Self> {
        let directory = SqliteDirectory::new(pool.clone());
        directory.migrate().await?;

        let report_store = SqliteReportStore::new(pool.clone());
        report_store.migrate().await?;

        let badge_store = SqliteBadgeStore::new(pool);
        badge_store.migrate().await?;

        Ok(Self {
            reports: Arc::new(ReportService::new(report_store, directory.clone())),
            badges: Arc::new(BadgeService::new(badge_store, directory)),
            tokens: Arc::new(tokens),
        })
    }
}
