//! Problem handlers: browsing the bank, running and submitting solutions

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Problem routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_problems))
        .route("/{id}", get(handler::get_problem))
        .route("/{id}/run", post(handler::run_tests))
        .route("/{id}/submit", post(handler::submit_solution))
}
