//! Problem repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::{Problem, ProblemError},
};

/// Problem bank shipped with the binary
const BUNDLED_PROBLEMS: &str = include_str!("../../data/problems.json");

/// Read-only access to problems
#[async_trait]
pub trait ProblemRepository: Send + Sync {
    /// Find problem by ID
    async fn get_problem(&self, id: &str) -> AppResult<Arc<Problem>>;

    /// All problems, in bank order
    async fn list_problems(&self) -> AppResult<Vec<Arc<Problem>>>;
}

/// Static problems loaded once at startup
#[derive(Debug, Clone)]
pub struct BundledProblemRepository {
    problems: Vec<Arc<Problem>>,
    by_id: HashMap<String, usize>,
}

impl BundledProblemRepository {
    /// Load the embedded problem bank
    pub fn load() -> Result<Self, ProblemError> {
        Self::from_json(BUNDLED_PROBLEMS)
    }

    /// Parse a JSON array of problems
    pub fn from_json(text: &str) -> Result<Self, ProblemError> {
        let problems: Vec<Problem> = serde_json::from_str(text)?;
        Self::from_problems(problems)
    }

    /// Validate and index problems
    pub fn from_problems(problems: Vec<Problem>) -> Result<Self, ProblemError> {
        let mut by_id = HashMap::with_capacity(problems.len());
        for (index, problem) in problems.iter().enumerate() {
            problem.validate()?;
            if by_id.insert(problem.id.clone(), index).is_some() {
                return Err(ProblemError::DuplicateId(problem.id.clone()));
            }
        }

        tracing::info!("Loaded {} problems", problems.len());
        Ok(Self {
            problems: problems.into_iter().map(Arc::new).collect(),
            by_id,
        })
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

#[async_trait]
impl ProblemRepository for BundledProblemRepository {
    async fn get_problem(&self, id: &str) -> AppResult<Arc<Problem>> {
        self.by_id
            .get(id)
            .map(|&index| Arc::clone(&self.problems[index]))
            .ok_or_else(|| AppError::NotFound(format!("Problem {} not found", id)))
    }

    async fn list_problems(&self) -> AppResult<Vec<Arc<Problem>>> {
        Ok(self.problems.clone())
    }
}
