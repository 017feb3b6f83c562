//! Problem model

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::TestCase;

/// Static problem definition, loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub statement: String,
    /// Display-only examples
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Documented name of the solution function
    pub entry_point: String,
    /// Declared parameter names, in call order
    pub parameters: Vec<String>,
    /// Starter code keyed by language id
    pub templates: BTreeMap<String, String>,
    pub test_cases: Vec<TestCase>,
}

impl Problem {
    /// Whether the problem declares a template for `language`
    pub fn supports_language(&self, language: &str) -> bool {
        self.templates.contains_key(language)
    }

    /// Declared language ids
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Test cases shown to candidates ("Run Tests")
    pub fn visible_test_cases(&self) -> Vec<TestCase> {
        self.test_cases.iter().filter(|tc| !tc.hidden).cloned().collect()
    }

    /// Check the invariants every bundled problem must satisfy
    pub fn validate(&self) -> Result<(), ProblemError> {
        if !is_identifier(&self.entry_point) {
            return Err(ProblemError::InvalidEntryPoint {
                problem: self.id.clone(),
                entry_point: self.entry_point.clone(),
            });
        }

        if self.test_cases.is_empty() {
            return Err(ProblemError::NoTestCases(self.id.clone()));
        }

        let declared: BTreeSet<&str> = self.parameters.iter().map(String::as_str).collect();
        if declared.len() != self.parameters.len() {
            return Err(ProblemError::DuplicateParameter(self.id.clone()));
        }

        for (index, case) in self.test_cases.iter().enumerate() {
            let keys: BTreeSet<&str> = case.input.keys().map(String::as_str).collect();
            if keys != declared {
                return Err(ProblemError::ParameterMismatch {
                    problem: self.id.clone(),
                    case: index + 1,
                    expected: self.parameters.join(", "),
                    found: keys.into_iter().collect::<Vec<_>>().join(", "),
                });
            }
        }

        Ok(())
    }
}

/// Problem difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// Example shown in the problem statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Problem bank errors, raised while loading
#[derive(Debug, thiserror::Error)]
pub enum ProblemError {
    #[error("Problem bank is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Problem {0} has no test cases")]
    NoTestCases(String),

    #[error("Problem {0} declares a parameter twice")]
    DuplicateParameter(String),

    #[error("Problem {problem}: entry point {entry_point:?} is not a valid identifier")]
    InvalidEntryPoint { problem: String, entry_point: String },

    #[error("Problem {problem}, test case {case}: inputs [{found}] do not match parameters [{expected}]")]
    ParameterMismatch {
        problem: String,
        case: usize,
        expected: String,
        found: String,
    },

    #[error("Duplicate problem id: {0}")]
    DuplicateId(String),
}

/// ASCII identifier accepted by every supported language
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
