//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "codeassess=info,tower_http=info";

// =============================================================================
// EVALUATION DEFAULTS
// =============================================================================

/// Default wall-clock limit per test case in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Extra time the evaluator waits past the sandbox timeout before giving up on an adapter
pub const DEFAULT_TIMEOUT_GRACE_MS: u64 = 1_000;

/// Default number of test cases executed concurrently within one evaluation
pub const DEFAULT_MAX_PARALLEL_CASES: usize = 4;

/// Maximum accepted source size in bytes
pub const MAX_SOURCE_CODE_LENGTH: u64 = 64 * 1024;

/// Request bodies above this size are rejected before deserialization
pub const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// Maximum length of a language identifier
pub const MAX_LANGUAGE_LENGTH: u64 = 32;

/// Maximum length of a candidate identifier
pub const MAX_CANDIDATE_ID_LENGTH: u64 = 128;

/// Message reported for every case when the solution function cannot be found
pub const ENTRY_POINT_NOT_FOUND: &str = "entry point not found";

// =============================================================================
// SANDBOX DEFAULTS
// =============================================================================

/// Default address-space limit for interpreters that tolerate one (MB)
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 512;

/// Default cap on files written by candidate code, including captured output
pub const DEFAULT_MAX_OUTPUT_BYTES: u64 = 1024 * 1024;

/// Longest stderr excerpt carried into a runtime error message
pub const MAX_ERROR_MESSAGE_CHARS: usize = 500;

/// Heap limit handed to V8 (MB)
pub const NODE_MAX_OLD_SPACE_MB: u64 = 256;

/// PATH given to sandboxed processes
pub const SANDBOX_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Default RLIMIT_NPROC inside a confined run
pub const DEFAULT_MAX_PROCESSES: u64 = 64;

/// User and group id a confined run sees itself as (nobody)
pub const SANDBOX_UID: u32 = 65534;

/// Where a confined run sees its workspace
pub const WORKSPACE_MOUNT: &str = "/tmp/sandbox";

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const JAVASCRIPT: &str = "javascript";
    pub const PYTHON: &str = "python";
    pub const JAVA: &str = "java";
    pub const CPP: &str = "cpp";

    /// All language identifiers problems may declare templates for
    pub const ALL: &[&str] = &[JAVASCRIPT, PYTHON, JAVA, CPP];
}

/// Files laid out in every sandbox workspace
pub mod sandbox_files {
    pub const INPUT: &str = "input.json";
    pub const RESULT: &str = "result.json";
    pub const STDOUT: &str = "stdout.log";
    pub const STDERR: &str = "stderr.log";
}
