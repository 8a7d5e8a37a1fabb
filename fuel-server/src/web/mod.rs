//! Thin HTTP query surface over the fuel station core.

mod dto;
mod routes;
mod state;

pub use routes::{AppError, create_router};
pub use state::AppState;
