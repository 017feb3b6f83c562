//! Progress store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{ProgressRecord, Verdict},
};

/// Persistence for assessment progress. Callers do not depend on the outcome.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn record_verdict(
        &self,
        candidate_id: &str,
        problem_id: &str,
        verdict: &Verdict,
    ) -> AppResult<()>;

    /// Latest record per problem for one candidate
    async fn progress(&self, candidate_id: &str) -> AppResult<Vec<ProgressRecord>>;
}

/// Keeps the latest score/flag per (candidate, problem) in memory
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    records: RwLock<HashMap<(String, String), ProgressRecord>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn record_verdict(
        &self,
        candidate_id: &str,
        problem_id: &str,
        verdict: &Verdict,
    ) -> AppResult<()> {
        let record = ProgressRecord::from_verdict(candidate_id, problem_id, verdict);
        self.records
            .write()
            .await
            .insert((candidate_id.to_string(), problem_id.to_string()), record);
        Ok(())
    }

    async fn progress(&self, candidate_id: &str) -> AppResult<Vec<ProgressRecord>> {
        let mut records: Vec<ProgressRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.candidate_id == candidate_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.problem_id.cmp(&b.problem_id));
        Ok(records)
    }
}
