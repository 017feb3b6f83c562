//! Language-specific execution adapters
//!
//! Each adapter writes the candidate's code next to a small harness, runs the
//! harness in the process sandbox, and reads back the single JSON report the
//! harness leaves in the workspace:
//!
//! ```json
//! {"status": "ok", "value": ...}
//! {"status": "error", "message": "..."}
//! {"status": "missing_entry_point"}
//! ```

pub mod javascript;
pub mod python;

use std::os::unix::process::ExitStatusExt;

use nix::sys::signal::Signal;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::constants::MAX_ERROR_MESSAGE_CHARS;

use super::adapter::{Invocation, RunOutcome};
use super::error::SandboxError;
use super::sandbox::{SandboxOutput, SandboxRun};

pub use javascript::JavaScriptAdapter;
pub use python::PythonAdapter;

/// Report left behind by a harness
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum HarnessReport {
    Ok { value: Value },
    Error { message: String },
    MissingEntryPoint,
}

/// Contents of `input.json` for one invocation
fn harness_request(invocation: &Invocation<'_>) -> Result<String, SandboxError> {
    let request = json!({
        "entry_point": invocation.entry_point,
        "arguments": invocation.arguments,
    });
    Ok(serde_json::to_string(&request)?)
}

/// Map a finished sandbox run onto the adapter contract
fn interpret(run: SandboxRun) -> RunOutcome {
    let output = match run {
        SandboxRun::TimedOut => return RunOutcome::TimedOut,
        SandboxRun::Completed(output) => output,
    };

    if let Some(signal) = output.status.signal() {
        if signal == Signal::SIGXCPU as i32 {
            return RunOutcome::TimedOut;
        }
        if signal == Signal::SIGXFSZ as i32 {
            return RunOutcome::Fault("output limit exceeded".to_string());
        }
    }

    match output.result.as_deref().map(serde_json::from_str::<HarnessReport>) {
        Some(Ok(HarnessReport::Ok { value })) => RunOutcome::Returned(value),
        Some(Ok(HarnessReport::Error { message })) => RunOutcome::Fault(message),
        Some(Ok(HarnessReport::MissingEntryPoint)) => RunOutcome::EntryPointMissing,
        Some(Err(e)) => {
            tracing::debug!("Unreadable harness report: {}", e);
            RunOutcome::Fault("harness produced an unreadable result".to_string())
        }
        None => RunOutcome::Fault(describe_exit(&output)),
    }
}

/// Message for a process that died without reporting
fn describe_exit(output: &SandboxOutput) -> String {
    if !output.stderr.is_empty() {
        let tail: Vec<char> = output.stderr.chars().rev().take(MAX_ERROR_MESSAGE_CHARS).collect();
        return tail.into_iter().rev().collect();
    }
    if let Some(signal) = output.status.signal() {
        return format!("Killed by signal {}", signal);
    }
    match output.status.code() {
        Some(code) => format!("Process exited with code {} without returning a value", code),
        None => "Process exited without returning a value".to_string(),
    }
}
