//! Outcome types and aggregate scoring

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::ENTRY_POINT_NOT_FOUND;

/// Outcome of running one test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// Produced value matched the expectation
    Passed,
    /// Produced value did not match
    Failed,
    /// Candidate code raised a fault
    RuntimeError,
    /// Exceeded the wall-clock limit
    Timeout,
    /// No execution adapter exists for the language; neither pass nor fail
    NotExecuted,
}

impl Outcome {
    /// Get short code for outcome
    pub fn code(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed => "FAIL",
            Outcome::RuntimeError => "RE",
            Outcome::Timeout => "TLE",
            Outcome::NotExecuted => "NE",
        }
    }

    /// Check if outcome counts against the candidate
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::Failed | Outcome::RuntimeError | Outcome::Timeout
        )
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Result of executing a single test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Test case number (1-indexed, input order)
    pub case_number: usize,

    pub outcome: Outcome,

    /// Value returned by the candidate (only for Passed/Failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produced: Option<Value>,

    /// Fault message (only for RuntimeError)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Wall time of the run in milliseconds (absent when nothing ran)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<u64>,
}

/// Timing varies between identical runs, so it does not take part in equality.
impl PartialEq for ExecutionResult {
    fn eq(&self, other: &Self) -> bool {
        self.case_number == other.case_number
            && self.outcome == other.outcome
            && self.produced == other.produced
            && self.error_message == other.error_message
    }
}

impl ExecutionResult {
    pub fn passed(case_number: usize, produced: Value) -> Self {
        Self {
            case_number,
            outcome: Outcome::Passed,
            produced: Some(produced),
            error_message: None,
            time_ms: None,
        }
    }

    pub fn failed(case_number: usize, produced: Value) -> Self {
        Self {
            case_number,
            outcome: Outcome::Failed,
            produced: Some(produced),
            error_message: None,
            time_ms: None,
        }
    }

    pub fn runtime_error(case_number: usize, message: impl Into<String>) -> Self {
        Self {
            case_number,
            outcome: Outcome::RuntimeError,
            produced: None,
            error_message: Some(message.into()),
            time_ms: None,
        }
    }

    pub fn timeout(case_number: usize) -> Self {
        Self {
            case_number,
            outcome: Outcome::Timeout,
            produced: None,
            error_message: None,
            time_ms: None,
        }
    }

    /// Attach the measured wall time
    pub fn timed(mut self, elapsed: Duration) -> Self {
        self.time_ms = Some(elapsed.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn not_executed(case_number: usize) -> Self {
        Self {
            case_number,
            outcome: Outcome::NotExecuted,
            produced: None,
            error_message: None,
            time_ms: None,
        }
    }
}

/// Aggregated result for an entire submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub all_passed: bool,
    pub passed_count: usize,
    pub total_count: usize,
    /// 0-100
    pub score: u8,
    /// Set when some cases could not be executed at all
    pub partial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// One entry per test case, in input order
    pub results: Vec<ExecutionResult>,
}

impl Verdict {
    /// Create verdict from test case results
    pub fn from_results(results: Vec<ExecutionResult>) -> Self {
        let total_count = results.len();
        let passed_count = results
            .iter()
            .filter(|r| r.outcome == Outcome::Passed)
            .count();

        Self {
            all_passed: total_count > 0 && passed_count == total_count,
            passed_count,
            total_count,
            score: percentage(passed_count, total_count),
            partial: false,
            reason: None,
            results,
        }
    }

    /// Every case unexecuted because the language has no adapter
    pub fn not_executed(total_count: usize, language: &str) -> Self {
        let results = (1..=total_count).map(ExecutionResult::not_executed).collect();
        Self {
            partial: true,
            reason: Some(format!("execution unavailable for language {}", language)),
            ..Self::from_results(results)
        }
    }

    /// Fatal for the whole submission: the solution function could not be located
    pub fn entry_point_missing(total_count: usize) -> Self {
        let results = (1..=total_count)
            .map(|n| ExecutionResult::runtime_error(n, ENTRY_POINT_NOT_FOUND))
            .collect();
        Self::from_results(results)
    }

    /// First failing case number (if any)
    pub fn first_failure(&self) -> Option<usize> {
        self.results
            .iter()
            .find(|r| r.outcome.is_failure())
            .map(|r| r.case_number)
    }
}

/// Integer percentage, rounding half up
pub fn percentage(passed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((200 * passed + total) / (2 * total)).min(100) as u8
}
