// Core reports module - report submission and the moderation queue.

pub mod report_models;
pub mod report_service;

pub use report_models::*;
pub use report_service::*;
