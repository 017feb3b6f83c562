//! Submission evaluation engine
//!
//! A submission is judged by running its entry point once per test case, each
//! run in a fresh process sandbox, and comparing the returned value against
//! the expectation:
//!
//! 1. **Registry** (`registry.rs`): language id → execution adapter.
//! 2. **Adapters** (`languages/`): locate the entry point and drive a
//!    language-specific harness inside the sandbox.
//! 3. **Sandbox** (`sandbox.rs`): temporary workspace + process group with
//!    resource limits, torn down on completion, timeout or cancellation.
//!    `isolation.rs` confines the process to private namespaces.
//! 4. **Evaluator** (`evaluator.rs`): validation, per-case fan-out, comparison
//!    (`compare.rs`) and scoring.

pub mod adapter;
pub mod compare;
pub mod entry_point;
pub mod error;
pub mod evaluator;
mod isolation;
pub mod languages;
pub mod registry;
pub mod sandbox;

pub use adapter::{ExecutionAdapter, Invocation, RunOutcome};
pub use error::{EvaluateError, SandboxError};
pub use evaluator::Evaluator;
pub use registry::AdapterRegistry;
pub use sandbox::ProcessSandbox;
