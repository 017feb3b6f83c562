//! CodeAssess - Submission Evaluation for Coding Assessments
//!
//! This library provides the evaluation core of the CodeAssess platform:
//! candidates write a solution function in the browser, and the server runs
//! it against a problem's test cases and returns a per-case verdict plus a
//! 0-100 score.
//!
//! # Features
//!
//! - Out-of-process sandbox per test case (fresh workspace, process group,
//!   resource limits, wall-clock timeout)
//! - Python and JavaScript execution adapters behind one trait
//! - Order-independent comparison of list results
//! - Explicit "not executed" verdicts for languages without an adapter
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Run/submit actions
//! - **Judge**: Evaluator, adapters and sandbox
//! - **Repositories**: Problem bank and progress store
//! - **Models**: Domain models and DTOs

pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod judge;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use judge::Evaluator;
pub use state::AppState;
