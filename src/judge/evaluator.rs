//! Submission evaluator

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{StreamExt, TryStreamExt, stream};
use serde_json::Value;

use crate::config::EvaluatorConfig;
use crate::models::{ExecutionResult, Problem, Submission, TestCase, Verdict};

use super::adapter::{ExecutionAdapter, Invocation, RunOutcome};
use super::compare::outputs_match;
use super::error::{EvaluateError, SandboxError};
use super::registry::AdapterRegistry;

/// Turns a (problem, submission) pair into a verdict.
///
/// Holds no per-evaluation state; one instance serves concurrent callers.
#[derive(Debug, Clone)]
pub struct Evaluator {
    registry: Arc<AdapterRegistry>,
    timeout: Duration,
    timeout_grace: Duration,
    max_parallel_cases: usize,
}

impl Evaluator {
    pub fn new(registry: Arc<AdapterRegistry>, config: &EvaluatorConfig) -> Self {
        Self {
            registry,
            timeout: config.timeout(),
            timeout_grace: config.timeout_grace(),
            max_parallel_cases: config.max_parallel_cases.max(1),
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Evaluate against every test case of the problem
    pub async fn evaluate(
        &self,
        problem: &Problem,
        submission: &Submission,
    ) -> Result<Verdict, EvaluateError> {
        self.evaluate_cases(problem, submission, &problem.test_cases)
            .await
    }

    /// Evaluate against a caller-chosen subset of the problem's test cases
    pub async fn evaluate_cases(
        &self,
        problem: &Problem,
        submission: &Submission,
        cases: &[TestCase],
    ) -> Result<Verdict, EvaluateError> {
        if !problem.supports_language(&submission.language) {
            return Err(EvaluateError::UnsupportedLanguage {
                language: submission.language.clone(),
                problem_id: problem.id.clone(),
            });
        }
        if submission.code.trim().is_empty() {
            return Err(EvaluateError::EmptySubmission);
        }

        let Some(adapter) = self.registry.get(&submission.language) else {
            tracing::warn!(
                "No execution adapter for {}, submission {} not executed",
                submission.language,
                submission.id
            );
            return Ok(Verdict::not_executed(cases.len(), &submission.language));
        };

        let Some(entry_point) = adapter.locate_entry_point(&submission.code, &problem.entry_point)
        else {
            tracing::info!(
                "Submission {} for {}: entry point not found",
                submission.id,
                problem.id
            );
            return Ok(Verdict::entry_point_missing(cases.len()));
        };

        tracing::info!(
            "Evaluating submission {} for {} ({}, entry point {}, {} cases)",
            submission.id,
            problem.id,
            submission.language,
            entry_point,
            cases.len()
        );

        let adapter: &dyn ExecutionAdapter = adapter.as_ref();
        let code = submission.code.as_str();
        let entry_point = entry_point.as_str();

        let runs: Vec<_> = cases
            .iter()
            .map(|case| self.run_case(adapter, code, entry_point, case.arguments(&problem.parameters)))
            .collect();

        // `buffered` keeps input order; dropping this future drops every in-flight run.
        let outcomes: Vec<(RunOutcome, Duration)> = stream::iter(runs)
            .buffered(self.max_parallel_cases)
            .try_collect()
            .await
            .inspect_err(|e| {
                tracing::error!("Sandbox failure evaluating submission {}: {}", submission.id, e)
            })?;

        if outcomes
            .iter()
            .any(|(outcome, _)| *outcome == RunOutcome::EntryPointMissing)
        {
            tracing::info!(
                "Submission {}: {} is not callable",
                submission.id,
                entry_point
            );
            return Ok(Verdict::entry_point_missing(cases.len()));
        }

        let results = cases
            .iter()
            .zip(outcomes)
            .enumerate()
            .map(|(index, (case, (outcome, elapsed)))| {
                judge_case(index + 1, case, outcome).timed(elapsed)
            })
            .collect();

        let verdict = Verdict::from_results(results);
        match verdict.first_failure() {
            Some(case_number) => tracing::info!(
                "Submission {} scored {} ({}/{}), first failure at case {}",
                submission.id,
                verdict.score,
                verdict.passed_count,
                verdict.total_count,
                case_number
            ),
            None => tracing::info!(
                "Submission {} scored {} ({}/{})",
                submission.id,
                verdict.score,
                verdict.passed_count,
                verdict.total_count
            ),
        }
        Ok(verdict)
    }

    async fn run_case(
        &self,
        adapter: &dyn ExecutionAdapter,
        code: &str,
        entry_point: &str,
        arguments: Vec<Value>,
    ) -> Result<(RunOutcome, Duration), SandboxError> {
        let invocation = Invocation {
            code,
            entry_point,
            arguments: &arguments,
            timeout: self.timeout,
        };

        let started = Instant::now();
        // Backstop for adapters that fail to honour their own timeout.
        let outcome = match tokio::time::timeout(
            self.timeout + self.timeout_grace,
            adapter.run(invocation),
        )
        .await
        {
            Ok(outcome) => outcome?,
            Err(_) => {
                tracing::warn!(
                    "{} adapter overran its {}ms timeout, abandoning run",
                    adapter.language(),
                    self.timeout.as_millis()
                );
                RunOutcome::TimedOut
            }
        };
        Ok((outcome, started.elapsed()))
    }
}

fn judge_case(case_number: usize, case: &TestCase, outcome: RunOutcome) -> ExecutionResult {
    let result = match outcome {
        RunOutcome::Returned(value) if outputs_match(&value, &case.expected) => {
            ExecutionResult::passed(case_number, value)
        }
        RunOutcome::Returned(value) => ExecutionResult::failed(case_number, value),
        RunOutcome::Fault(message) => ExecutionResult::runtime_error(case_number, message),
        RunOutcome::TimedOut => ExecutionResult::timeout(case_number),
        RunOutcome::EntryPointMissing => {
            ExecutionResult::runtime_error(case_number, crate::constants::ENTRY_POINT_NOT_FOUND)
        }
    };
    tracing::debug!("Case {}: {}", case_number, result.outcome);
    result
}
