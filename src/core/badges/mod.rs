// Core badges module - badge catalogue and awards.

pub mod badge_models;
pub mod badge_service;

pub use badge_models::*;
pub use badge_service::*;
