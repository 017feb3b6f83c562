//! Assessment service
//!
//! The two candidate actions of an assessment: "Run Tests" against the
//! visible cases and "Submit" against every case, with the submitted score
//! handed to the progress store in the background.

use std::sync::Arc;

use crate::{
    error::AppResult,
    judge::Evaluator,
    models::{Problem, ProgressRecord, Submission, Verdict},
    repositories::{ProblemRepository, ProgressStore},
};

/// Assessment service for business logic
#[derive(Clone)]
pub struct AssessmentService {
    problems: Arc<dyn ProblemRepository>,
    progress: Arc<dyn ProgressStore>,
    evaluator: Arc<Evaluator>,
}

impl AssessmentService {
    pub fn new(
        problems: Arc<dyn ProblemRepository>,
        progress: Arc<dyn ProgressStore>,
        evaluator: Arc<Evaluator>,
    ) -> Self {
        Self {
            problems,
            progress,
            evaluator,
        }
    }

    /// Languages that actually run (others evaluate as not executed)
    pub fn executable_languages(&self) -> Vec<&'static str> {
        self.evaluator.registry().languages()
    }

    pub async fn list_problems(&self) -> AppResult<Vec<Arc<Problem>>> {
        self.problems.list_problems().await
    }

    pub async fn get_problem(&self, problem_id: &str) -> AppResult<Arc<Problem>> {
        self.problems.get_problem(problem_id).await
    }

    /// Evaluate against the visible test cases only. Nothing is recorded.
    pub async fn run_tests(
        &self,
        problem_id: &str,
        language: &str,
        code: &str,
    ) -> AppResult<Verdict> {
        let problem = self.problems.get_problem(problem_id).await?;
        let submission = Submission::new(problem_id, language, code);
        let cases = problem.visible_test_cases();

        tracing::info!(
            "Running submission {} ({}) against {} visible cases of {}",
            submission.id,
            language,
            cases.len(),
            problem_id
        );

        let verdict = self
            .evaluator
            .evaluate_cases(&problem, &submission, &cases)
            .await?;
        Ok(verdict)
    }

    /// Evaluate against every test case and record the score.
    ///
    /// The verdict is returned as soon as evaluation finishes; the progress
    /// write happens on a spawned task and its failure is only logged.
    pub async fn submit_solution(
        &self,
        candidate_id: &str,
        problem_id: &str,
        language: &str,
        code: &str,
    ) -> AppResult<Verdict> {
        let problem = self.problems.get_problem(problem_id).await?;
        let submission = Submission::new(problem_id, language, code);

        tracing::info!(
            "Candidate {} submitted {} ({}) for {}",
            candidate_id,
            submission.id,
            language,
            problem_id
        );

        let verdict = self.evaluator.evaluate(&problem, &submission).await?;

        let progress = Arc::clone(&self.progress);
        let candidate_id = candidate_id.to_string();
        let problem_id = problem_id.to_string();
        let recorded = verdict.clone();
        tokio::spawn(async move {
            if let Err(e) = progress
                .record_verdict(&candidate_id, &problem_id, &recorded)
                .await
            {
                tracing::warn!(
                    "Failed to record progress for {} on {}: {}",
                    candidate_id,
                    problem_id,
                    e
                );
            }
        });

        Ok(verdict)
    }

    /// Recorded scores for one candidate
    pub async fn progress(&self, candidate_id: &str) -> AppResult<Vec<ProgressRecord>> {
        self.progress.progress(candidate_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use crate::error::AppError;
    use crate::judge::{AdapterRegistry, RunOutcome};
    use crate::models::Outcome;
    use crate::repositories::{BundledProblemRepository, InMemoryProgressStore};
    use crate::test_utils::{ScriptedAdapter, evaluator_config};

    fn always_true(_: &[Value]) -> RunOutcome {
        RunOutcome::Returned(json!(true))
    }

    fn service_with(progress: Arc<dyn ProgressStore>) -> AssessmentService {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(ScriptedAdapter::new("javascript", always_true)));
        let evaluator = Evaluator::new(Arc::new(registry), &evaluator_config(1_000));
        let problems = BundledProblemRepository::load().unwrap();
        AssessmentService::new(Arc::new(problems), progress, Arc::new(evaluator))
    }

    async fn wait_for_progress(
        store: &dyn ProgressStore,
        candidate_id: &str,
    ) -> Vec<ProgressRecord> {
        for _ in 0..100 {
            let records = store.progress(candidate_id).await.unwrap();
            if !records.is_empty() {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Vec::new()
    }

    const ALWAYS_TRUE: &str = "function isValid(s) { return true; }";

    #[tokio::test]
    async fn test_run_tests_uses_visible_cases_only() {
        let store = Arc::new(InMemoryProgressStore::new());
        let service = service_with(store.clone());

        let verdict = service
            .run_tests("valid-parentheses", "javascript", ALWAYS_TRUE)
            .await
            .unwrap();

        assert_eq!(verdict.total_count, 3);
        assert_eq!(verdict.passed_count, 2);
        assert_eq!(verdict.score, 67);
        assert_eq!(verdict.results[2].outcome, Outcome::Failed);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.progress("anyone").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_runs_hidden_cases_and_records() {
        let store = Arc::new(InMemoryProgressStore::new());
        let service = service_with(store.clone());

        let verdict = service
            .submit_solution("alice", "valid-parentheses", "javascript", ALWAYS_TRUE)
            .await
            .unwrap();

        // 6 cases, 3 expect true
        assert_eq!(verdict.total_count, 6);
        assert_eq!(verdict.passed_count, 3);
        assert_eq!(verdict.score, 50);

        let records = wait_for_progress(store.as_ref(), "alice").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].problem_id, "valid-parentheses");
        assert_eq!(records[0].score, 50);
        assert!(!records[0].all_passed);
    }

    #[tokio::test]
    async fn test_unknown_problem_is_not_found() {
        let service = service_with(Arc::new(InMemoryProgressStore::new()));
        let result = service
            .run_tests("no-such-problem", "javascript", ALWAYS_TRUE)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unsupported_language_is_rejected() {
        let service = service_with(Arc::new(InMemoryProgressStore::new()));
        let result = service
            .submit_solution("alice", "two-sum", "rust", "fn two_sum() {}")
            .await;
        assert!(matches!(result, Err(AppError::UnsupportedLanguage { .. })));
    }

    struct BrokenStore;

    #[async_trait]
    impl ProgressStore for BrokenStore {
        async fn record_verdict(&self, _: &str, _: &str, _: &Verdict) -> AppResult<()> {
            Err(AppError::Internal(anyhow::anyhow!("store offline")))
        }

        async fn progress(&self, _: &str) -> AppResult<Vec<ProgressRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_store_failure_does_not_affect_verdict() {
        let service = service_with(Arc::new(BrokenStore));
        let verdict = service
            .submit_solution("alice", "valid-parentheses", "javascript", ALWAYS_TRUE)
            .await
            .unwrap();
        assert_eq!(verdict.score, 50);
    }

    #[tokio::test]
    async fn test_java_submission_is_partial() {
        let service = service_with(Arc::new(InMemoryProgressStore::new()));
        let verdict = service
            .run_tests(
                "two-sum",
                "java",
                "class Solution { public int[] twoSum(int[] n, int t) { return n; } }",
            )
            .await
            .unwrap();
        assert!(verdict.partial);
        assert_eq!(verdict.score, 0);
        assert!(
            verdict
                .results
                .iter()
                .all(|r| r.outcome == Outcome::NotExecuted)
        );
    }
}
