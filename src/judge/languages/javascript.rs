//! JavaScript adapter (Node.js)

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SandboxConfig;
use crate::constants::{NODE_MAX_OLD_SPACE_MB, languages, sandbox_files};
use crate::judge::adapter::{ExecutionAdapter, Invocation, RunOutcome};
use crate::judge::entry_point;
use crate::judge::error::SandboxError;
use crate::judge::sandbox::{ProcessSandbox, SandboxCommand};

const HARNESS: &str = include_str!("harness/javascript.js");

/// Runs `solution.js` through the harness under node.
///
/// V8 reserves far more virtual memory than it uses, so no address-space
/// limit is set; the heap is capped with `--max-old-space-size` instead.
#[derive(Debug, Clone)]
pub struct JavaScriptAdapter {
    sandbox: Arc<ProcessSandbox>,
    interpreter: String,
}

impl JavaScriptAdapter {
    pub fn new(sandbox: Arc<ProcessSandbox>, config: &SandboxConfig) -> Self {
        Self {
            sandbox,
            interpreter: config.node_bin.clone(),
        }
    }
}

#[async_trait]
impl ExecutionAdapter for JavaScriptAdapter {
    fn language(&self) -> &'static str {
        languages::JAVASCRIPT
    }

    fn top_level_functions(&self, code: &str) -> Vec<String> {
        entry_point::javascript_functions(code)
    }

    async fn run(&self, invocation: Invocation<'_>) -> Result<RunOutcome, SandboxError> {
        let request = super::harness_request(&invocation)?;
        let command = SandboxCommand {
            program: &self.interpreter,
            args: vec![
                format!("--max-old-space-size={}", NODE_MAX_OLD_SPACE_MB),
                "harness.js".to_string(),
            ],
            files: vec![
                ("solution.js", invocation.code),
                ("harness.js", HARNESS),
                (sandbox_files::INPUT, request.as_str()),
            ],
            memory_limit_bytes: None,
        };

        let run = self.sandbox.execute(command, invocation.timeout).await?;
        Ok(super::interpret(run))
    }
}
