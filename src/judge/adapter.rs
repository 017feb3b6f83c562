use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::entry_point;
use super::error::SandboxError;

/// One call of a candidate's entry point
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub code: &'a str,
    pub entry_point: &'a str,
    pub arguments: &'a [Value],
    pub timeout: Duration,
}

/// What came back from a sandboxed call
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Returned(Value),
    Fault(String),
    TimedOut,
    /// The located name turned out not to be a callable at runtime
    EntryPointMissing,
}

/// Execution capability for one language.
///
/// Adding a language means registering one more implementation.
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    fn language(&self) -> &'static str;

    /// Names of functions defined at the top level of `code`, in source order
    fn top_level_functions(&self, code: &str) -> Vec<String>;

    /// Pick the solution function: the documented name if defined, else the only
    /// top-level function.
    fn locate_entry_point(&self, code: &str, documented: &str) -> Option<String> {
        entry_point::select(&self.top_level_functions(code), documented)
    }

    /// Run the entry point in isolation. Must stop the computation once
    /// `invocation.timeout` elapses, and release everything when the future is dropped.
    async fn run(&self, invocation: Invocation<'_>) -> Result<RunOutcome, SandboxError>;
}
