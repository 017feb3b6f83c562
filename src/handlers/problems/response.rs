//! Problem response DTOs

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{Difficulty, Example, Problem};

/// Problem summary for list views
#[derive(Debug, Serialize)]
pub struct ProblemSummary {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub tags: BTreeSet<String>,
}

impl From<&Problem> for ProblemSummary {
    fn from(problem: &Problem) -> Self {
        Self {
            id: problem.id.clone(),
            title: problem.title.clone(),
            difficulty: problem.difficulty,
            tags: problem.tags.clone(),
        }
    }
}

/// Problem list response
#[derive(Debug, Serialize)]
pub struct ProblemsListResponse {
    pub problems: Vec<ProblemSummary>,
    pub total: usize,
}

/// Visible test case. Hidden cases never leave the server.
#[derive(Debug, Serialize)]
pub struct TestCaseResponse {
    pub input: Map<String, Value>,
    pub expected: Value,
}

/// Full problem as shown in the editor
#[derive(Debug, Serialize)]
pub struct ProblemResponse {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub tags: BTreeSet<String>,
    pub statement: String,
    pub examples: Vec<Example>,
    pub constraints: Vec<String>,
    pub entry_point: String,
    pub parameters: Vec<String>,
    pub templates: BTreeMap<String, String>,
    pub test_cases: Vec<TestCaseResponse>,
}

impl From<&Problem> for ProblemResponse {
    fn from(problem: &Problem) -> Self {
        Self {
            id: problem.id.clone(),
            title: problem.title.clone(),
            difficulty: problem.difficulty,
            tags: problem.tags.clone(),
            statement: problem.statement.clone(),
            examples: problem.examples.clone(),
            constraints: problem.constraints.clone(),
            entry_point: problem.entry_point.clone(),
            parameters: problem.parameters.clone(),
            templates: problem.templates.clone(),
            test_cases: problem
                .visible_test_cases()
                .into_iter()
                .map(|tc| TestCaseResponse {
                    input: tc.input,
                    expected: tc.expected,
                })
                .collect(),
        }
    }
}
