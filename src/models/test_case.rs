//! Test case model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One input/expected pair. Values are language-agnostic JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Argument values keyed by parameter name
    pub input: Map<String, Value>,
    pub expected: Value,
    /// Hidden cases only run on "Submit"
    #[serde(default)]
    pub hidden: bool,
}

impl TestCase {
    /// Build a visible test case from a JSON object of inputs.
    ///
    /// A non-object `input` yields an empty input map.
    pub fn new(input: Value, expected: Value) -> Self {
        let input = match input {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            input,
            expected,
            hidden: false,
        }
    }

    /// Positional call arguments, bound by name in declared parameter order
    pub fn arguments(&self, parameters: &[String]) -> Vec<Value> {
        parameters
            .iter()
            .map(|name| self.input.get(name).cloned().unwrap_or(Value::Null))
            .collect()
    }
}
