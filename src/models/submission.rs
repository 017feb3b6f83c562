//! Submission model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A candidate's code for one problem. Never mutated; an edit is a new submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub problem_id: String,
    pub language: String,
    #[serde(skip_serializing)]
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        problem_id: impl Into<String>,
        language: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            problem_id: problem_id.into(),
            language: language.into(),
            code: code.into(),
            created_at: Utc::now(),
        }
    }
}
