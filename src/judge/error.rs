//! Evaluation error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by `Evaluator::evaluate`.
///
/// Per-case faults and timeouts are outcomes, not errors.
#[derive(Error, Debug)]
pub enum EvaluateError {
    #[error("Language {language} is not supported by problem {problem_id}")]
    UnsupportedLanguage {
        language: String,
        problem_id: String,
    },

    #[error("Submission contains no code")]
    EmptySubmission,

    #[error("Sandbox unavailable: {0}")]
    SandboxUnavailable(#[from] SandboxError),
}

/// Infrastructure failures of the isolation mechanism
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("failed to prepare workspace under {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("namespace isolation unavailable: {0}")]
    Isolation(String),

    #[error("failed to wait for sandboxed process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("failed to encode harness request: {0}")]
    Request(#[from] serde_json::Error),
}
