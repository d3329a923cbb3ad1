// HTTP layer - axum routes, bearer auth and error mapping.
// Handlers stay thin: parse the request, call a core service, serialize.

#[path = "routes/route_catalog.rs"]
pub mod routes;

pub mod auth;
pub mod error;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
