//! Assessment progress model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Verdict;

/// The part of a verdict persisted as assessment progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub candidate_id: String,
    pub problem_id: String,
    pub score: u8,
    pub all_passed: bool,
    pub recorded_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn from_verdict(candidate_id: &str, problem_id: &str, verdict: &Verdict) -> Self {
        Self {
            candidate_id: candidate_id.to_string(),
            problem_id: problem_id.to_string(),
            score: verdict.score,
            all_passed: verdict.all_passed,
            recorded_at: Utc::now(),
        }
    }
}
