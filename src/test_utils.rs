//! Shared test fixtures: scripted adapters, sample problems, sandbox settings

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::config::{EvaluatorConfig, SandboxConfig};
use crate::judge::entry_point;
use crate::judge::{ExecutionAdapter, Invocation, ProcessSandbox, RunOutcome, SandboxError};
use crate::models::{Difficulty, Problem, TestCase};

type Script = dyn Fn(&[Value]) -> RunOutcome + Send + Sync;
type Delay = dyn Fn(&[Value]) -> Duration + Send + Sync;

enum Mode {
    Script(Box<Script>),
    Hang,
    Fail,
}

/// In-memory adapter whose answers come from a closure over the call arguments.
///
/// Entry points are discovered with the JavaScript rules.
pub struct ScriptedAdapter {
    language: &'static str,
    mode: Mode,
    delay: Option<Box<Delay>>,
    runs: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

impl ScriptedAdapter {
    pub fn new(
        language: &'static str,
        script: impl Fn(&[Value]) -> RunOutcome + Send + Sync + 'static,
    ) -> Self {
        Self::with_mode(language, Mode::Script(Box::new(script)))
    }

    /// Never returns, ignoring its timeout
    pub fn hanging(language: &'static str) -> Self {
        Self::with_mode(language, Mode::Hang)
    }

    /// Every run is an infrastructure failure
    pub fn failing(language: &'static str) -> Self {
        Self::with_mode(language, Mode::Fail)
    }

    fn with_mode(language: &'static str, mode: Mode) -> Self {
        Self {
            language,
            mode,
            delay: None,
            runs: Arc::new(AtomicUsize::new(0)),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(
        mut self,
        delay: impl Fn(&[Value]) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    /// Number of runs started
    pub fn run_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.runs)
    }

    /// Number of runs currently in flight
    pub fn live_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.live)
    }
}

struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExecutionAdapter for ScriptedAdapter {
    fn language(&self) -> &'static str {
        self.language
    }

    fn top_level_functions(&self, code: &str) -> Vec<String> {
        entry_point::javascript_functions(code)
    }

    async fn run(&self, invocation: Invocation<'_>) -> Result<RunOutcome, SandboxError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        let _guard = LiveGuard(Arc::clone(&self.live));

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(invocation.arguments)).await;
        }

        match &self.mode {
            Mode::Script(script) => Ok(script(invocation.arguments)),
            Mode::Hang => std::future::pending().await,
            Mode::Fail => Err(SandboxError::Spawn {
                program: "scripted".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no interpreter"),
            }),
        }
    }
}

fn templates() -> BTreeMap<String, String> {
    ["javascript", "python", "java", "cpp"]
        .into_iter()
        .map(|lang| (lang.to_string(), String::new()))
        .collect()
}

/// "Two Sum" with the single case `[2,7,11,15], 9 -> [0,1]`
pub fn two_sum_problem() -> Problem {
    Problem {
        id: "two-sum".to_string(),
        title: "Two Sum".to_string(),
        difficulty: Difficulty::Easy,
        tags: BTreeSet::from(["array".to_string(), "hash-table".to_string()]),
        statement: "Return indices of the two numbers that add up to target.".to_string(),
        examples: Vec::new(),
        constraints: Vec::new(),
        entry_point: "twoSum".to_string(),
        parameters: vec!["nums".to_string(), "target".to_string()],
        templates: templates(),
        test_cases: vec![TestCase::new(
            json!({"nums": [2, 7, 11, 15], "target": 9}),
            json!([0, 1]),
        )],
    }
}

/// "Valid Parentheses" with `"()" -> true`, `"()[]{}" -> true`, `"(]" -> false`
pub fn valid_parentheses_problem() -> Problem {
    Problem {
        id: "valid-parentheses".to_string(),
        title: "Valid Parentheses".to_string(),
        difficulty: Difficulty::Easy,
        tags: BTreeSet::from(["stack".to_string(), "string".to_string()]),
        statement: "Determine if the input string has valid brackets.".to_string(),
        examples: Vec::new(),
        constraints: Vec::new(),
        entry_point: "isValid".to_string(),
        parameters: vec!["s".to_string()],
        templates: templates(),
        test_cases: vec![
            TestCase::new(json!({"s": "()"}), json!(true)),
            TestCase::new(json!({"s": "()[]{}"}), json!(true)),
            TestCase::new(json!({"s": "(]"}), json!(false)),
        ],
    }
}

pub fn evaluator_config(timeout_ms: u64) -> EvaluatorConfig {
    EvaluatorConfig {
        timeout_ms,
        timeout_grace_ms: 200,
        max_parallel_cases: 4,
    }
}

/// Unconfined sandbox, usable on hosts without user namespaces
pub fn sandbox_config(work_root: &Path) -> SandboxConfig {
    SandboxConfig {
        work_root: work_root.to_path_buf(),
        isolation: false,
        ..SandboxConfig::default()
    }
}

pub fn isolated_sandbox_config(work_root: &Path) -> SandboxConfig {
    SandboxConfig {
        work_root: work_root.to_path_buf(),
        isolation: true,
        ..SandboxConfig::default()
    }
}

/// Whether this host lets an unprivileged process enter fresh namespaces
pub async fn isolation_available() -> bool {
    let Ok(root) = tempfile::tempdir() else {
        return false;
    };
    let sandbox = ProcessSandbox::new(&isolated_sandbox_config(root.path()));
    sandbox.check_isolation().await.is_ok()
}

/// True when `path` has no entries (or does not exist)
pub fn empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true)
}

fn interpreter_available(program: &str) -> bool {
    std::process::Command::new(program)
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

pub fn python_available() -> bool {
    interpreter_available("python3")
}

pub fn node_available() -> bool {
    interpreter_available("node")
}
