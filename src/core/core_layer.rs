// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "directory/mod.rs"]
pub mod directory;

#[path = "reports/mod.rs"]
pub mod reports;

#[path = "badges/mod.rs"]
pub mod badges;

pub mod ids;
