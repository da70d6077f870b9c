//! Web layer for the tide service.
//!
//! Thin JSON endpoints over the station directory and tide aggregator.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
