// Core directory module - read access to users, roles and reportable content.

pub mod directory_models;
pub mod directory_store;

#[cfg(test)]
pub mod test_support;

pub use directory_models::*;
pub use directory_store::*;
