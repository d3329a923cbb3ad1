// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

pub mod database;

#[path = "directory/sqlite_directory.rs"]
pub mod directory;

#[path = "reports/sqlite_report_store.rs"]
pub mod reports;

#[path = "badges/sqlite_badge_store.rs"]
pub mod badges;
