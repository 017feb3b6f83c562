//! Repositories
//!
//! Read access to the problem bank and write access to assessment progress.
//! Both sit behind traits so a database-backed store can replace the
//! bundled/in-memory ones without touching the service layer.

pub mod problem_repo;
pub mod progress_repo;

pub use problem_repo::{BundledProblemRepository, ProblemRepository};
pub use progress_repo::{InMemoryProgressStore, ProgressStore};
