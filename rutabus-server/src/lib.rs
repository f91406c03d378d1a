//! HTTP surface for the rutabus journey planner.

pub mod config;
pub mod routes;
pub mod state;

pub use config::{Args, ServerConfig};
pub use routes::create_router;
pub use state::{AppState, SharedRepository};
