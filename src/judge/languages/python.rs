//! Python adapter

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SandboxConfig;
use crate::constants::{languages, sandbox_files};
use crate::judge::adapter::{ExecutionAdapter, Invocation, RunOutcome};
use crate::judge::entry_point;
use crate::judge::error::SandboxError;
use crate::judge::sandbox::{ProcessSandbox, SandboxCommand};

const HARNESS: &str = include_str!("harness/python.py");

/// Runs `solution.py` through the harness with `python3 -I -B`
#[derive(Debug, Clone)]
pub struct PythonAdapter {
    sandbox: Arc<ProcessSandbox>,
    interpreter: String,
    memory_limit_bytes: u64,
}

impl PythonAdapter {
    pub fn new(sandbox: Arc<ProcessSandbox>, config: &SandboxConfig) -> Self {
        Self {
            sandbox,
            interpreter: config.python_bin.clone(),
            memory_limit_bytes: config.memory_limit_bytes(),
        }
    }
}

#[async_trait]
impl ExecutionAdapter for PythonAdapter {
    fn language(&self) -> &'static str {
        languages::PYTHON
    }

    fn top_level_functions(&self, code: &str) -> Vec<String> {
        entry_point::python_functions(code)
    }

    async fn run(&self, invocation: Invocation<'_>) -> Result<RunOutcome, SandboxError> {
        let request = super::harness_request(&invocation)?;
        let command = SandboxCommand {
            program: &self.interpreter,
            args: vec!["-I".to_string(), "-B".to_string(), "harness.py".to_string()],
            files: vec![
                ("solution.py", invocation.code),
                ("harness.py", HARNESS),
                (sandbox_files::INPUT, request.as_str()),
            ],
            memory_limit_bytes: Some(self.memory_limit_bytes),
        };

        let run = self.sandbox.execute(command, invocation.timeout).await?;
        Ok(super::interpret(run))
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use serde_json::json;

    use super::*;
    use crate::constants::ENTRY_POINT_NOT_FOUND;
    use crate::judge::{AdapterRegistry, EvaluateError, Evaluator};
    use crate::models::{Outcome, Submission};
    use crate::test_utils::{
        empty_dir, evaluator_config, isolated_sandbox_config, isolation_available,
        python_available, sandbox_config, two_sum_problem, valid_parentheses_problem,
    };

    fn setup(root: &std::path::Path, timeout_ms: u64) -> (Evaluator, Arc<ProcessSandbox>) {
        let config = sandbox_config(root);
        let sandbox = Arc::new(ProcessSandbox::new(&config));
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(PythonAdapter::new(Arc::clone(&sandbox), &config)));
        let evaluator = Evaluator::new(Arc::new(registry), &evaluator_config(timeout_ms));
        (evaluator, sandbox)
    }

    #[tokio::test]
    async fn test_brute_force_two_sum_passes() {
        if !python_available() {
            eprintln!("python3 not installed, skipping");
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let (evaluator, sandbox) = setup(root.path(), 5_000);

        let code = "def two_sum(nums, target):\n    for i in range(len(nums)):\n        for j in range(i + 1, len(nums)):\n            if nums[i] + nums[j] == target:\n                return [j, i]\n    return []\n";
        let submission = Submission::new("two-sum", "python", code);
        let verdict = evaluator
            .evaluate(&two_sum_problem(), &submission)
            .await
            .unwrap();

        assert!(verdict.all_passed);
        assert_eq!(verdict.score, 100);
        assert_eq!(verdict.results[0].produced, Some(json!([1, 0])));
        assert_eq!(sandbox.active(), 0);
        assert!(empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_faults_are_runtime_errors() {
        if !python_available() {
            eprintln!("python3 not installed, skipping");
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let (evaluator, _sandbox) = setup(root.path(), 5_000);

        let code = "def is_valid(s):\n    return 1 // 0\n";
        let submission = Submission::new("valid-parentheses", "python", code);
        let verdict = evaluator
            .evaluate(&valid_parentheses_problem(), &submission)
            .await
            .unwrap();

        assert_eq!(verdict.score, 0);
        for result in &verdict.results {
            assert_eq!(result.outcome, Outcome::RuntimeError);
            assert!(result
                .error_message
                .as_deref()
                .unwrap()
                .starts_with("ZeroDivisionError"));
        }
    }

    #[tokio::test]
    async fn test_non_callable_entry_point_is_fatal() {
        if !python_available() {
            eprintln!("python3 not installed, skipping");
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let (evaluator, _sandbox) = setup(root.path(), 5_000);

        // the def is found, then shadowed before the harness looks it up
        let code = "def is_valid(s):\n    return True\nis_valid = 3\n";
        let submission = Submission::new("valid-parentheses", "python", code);
        let verdict = evaluator
            .evaluate(&valid_parentheses_problem(), &submission)
            .await
            .unwrap();

        assert_eq!(verdict.score, 0);
        assert!(verdict.results.iter().all(|r| {
            r.outcome == Outcome::RuntimeError
                && r.error_message.as_deref() == Some(ENTRY_POINT_NOT_FOUND)
        }));
    }

    #[tokio::test]
    async fn test_infinite_loop_times_out_without_leaking() {
        if !python_available() {
            eprintln!("python3 not installed, skipping");
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let (evaluator, sandbox) = setup(root.path(), 1_000);

        let code = "def is_valid(s):\n    if s == '()':\n        while True:\n            pass\n    return s == '()[]{}'\n";
        let submission = Submission::new("valid-parentheses", "python", code);

        let started = Instant::now();
        let verdict = evaluator
            .evaluate(&valid_parentheses_problem(), &submission)
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(4));
        let outcomes: Vec<Outcome> = verdict.results.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![Outcome::Timeout, Outcome::Passed, Outcome::Passed]
        );
        assert!(verdict.results[0].produced.is_none());
        assert_eq!(sandbox.active(), 0);
        assert!(empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_cancelled_evaluation_tears_down_sandboxes() {
        if !python_available() {
            eprintln!("python3 not installed, skipping");
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let (evaluator, sandbox) = setup(root.path(), 10_000);

        let code = "def is_valid(s):\n    while True:\n        pass\n";
        let submission = Submission::new("valid-parentheses", "python", code);
        let problem = valid_parentheses_problem();

        let cancelled = tokio::time::timeout(
            Duration::from_millis(500),
            evaluator.evaluate(&problem, &submission),
        )
        .await;

        assert!(cancelled.is_err());
        assert_eq!(sandbox.active(), 0);
        assert!(empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_sandbox_unavailable() {
        let root = tempfile::tempdir().unwrap();
        let mut config = sandbox_config(root.path());
        config.python_bin = "/nonexistent/python3".to_string();
        let sandbox = Arc::new(ProcessSandbox::new(&config));
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(PythonAdapter::new(Arc::clone(&sandbox), &config)));
        let evaluator = Evaluator::new(Arc::new(registry), &evaluator_config(5_000));

        let submission = Submission::new("two-sum", "python", "def two_sum(nums, target):\n    return []\n");
        let err = evaluator
            .evaluate(&two_sum_problem(), &submission)
            .await
            .unwrap_err();

        assert!(matches!(err, EvaluateError::SandboxUnavailable(_)));
        assert_eq!(sandbox.active(), 0);
    }

    #[tokio::test]
    async fn test_confined_solution_cannot_escape_or_linger() {
        if !python_available() || !isolation_available().await {
            eprintln!("python3 or namespaces unavailable, skipping");
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let config = isolated_sandbox_config(root.path());
        let sandbox = Arc::new(ProcessSandbox::new(&config));
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(PythonAdapter::new(Arc::clone(&sandbox), &config)));
        let evaluator = Evaluator::new(Arc::new(registry), &evaluator_config(5_000));

        let outside = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join(format!("escape-{}", uuid::Uuid::new_v4()));
        let code = format!(
            "import subprocess\n\
             def is_valid(s):\n\
             \x20   subprocess.Popen(['sleep', '63.2291'], start_new_session=True)\n\
             \x20   try:\n\
             \x20       open({:?}, 'w').write('x')\n\
             \x20       return False\n\
             \x20   except OSError:\n\
             \x20       return s == '()' or s == '()[]{{}}'\n",
            outside.display().to_string()
        );
        let submission = Submission::new("valid-parentheses", "python", code);
        let verdict = evaluator
            .evaluate(&valid_parentheses_problem(), &submission)
            .await
            .unwrap();

        assert_eq!(verdict.passed_count, 3);
        assert!(!outside.exists());

        let deadline = Instant::now() + Duration::from_secs(2);
        let lingering = || {
            std::fs::read_dir("/proc")
                .map(|entries| {
                    entries
                        .filter_map(Result::ok)
                        .filter_map(|e| std::fs::read(e.path().join("cmdline")).ok())
                        .any(|cmdline| String::from_utf8_lossy(&cmdline).contains("63.2291"))
                })
                .unwrap_or(false)
        };
        while lingering() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!lingering());
        assert_eq!(sandbox.active(), 0);
        assert!(empty_dir(root.path()));
    }
}
