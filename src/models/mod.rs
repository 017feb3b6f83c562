//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod problem;
pub mod progress;
pub mod submission;
pub mod test_case;
pub mod verdict;

pub use problem::*;
pub use progress::*;
pub use submission::*;
pub use test_case::*;
pub use verdict::*;
