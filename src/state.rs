//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::config::Config;
use crate::services::AssessmentService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Run/submit actions over the problem bank
    pub assessments: AssessmentService,

    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(assessments: AssessmentService, config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                assessments,
                config,
            }),
        }
    }

    /// Get a reference to the assessment service
    pub fn assessments(&self) -> &AssessmentService {
        &self.inner.assessments
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
