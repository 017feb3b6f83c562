//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_MAX_PARALLEL_CASES,
    DEFAULT_MAX_PROCESSES, DEFAULT_MEMORY_LIMIT_MB, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_TIMEOUT_GRACE_MS,
    DEFAULT_TIMEOUT_MS,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub evaluator: EvaluatorConfig,
    pub sandbox: SandboxConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Evaluation policy
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Wall-clock limit per test case in milliseconds
    pub timeout_ms: u64,
    /// Slack granted to an adapter past `timeout_ms` before the evaluator abandons it
    pub timeout_grace_ms: u64,
    /// Test cases run concurrently within one evaluation
    pub max_parallel_cases: usize,
}

/// Process sandbox configuration
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Directory under which per-case workspaces are created
    pub work_root: PathBuf,
    /// Address-space limit in megabytes (not applied to V8)
    pub memory_limit_mb: u64,
    /// Largest file a sandboxed process may write
    pub max_output_bytes: u64,
    /// Run candidates in private user/mount/pid/network namespaces
    pub isolation: bool,
    /// RLIMIT_NPROC for confined runs
    pub max_processes: u64,
    pub python_bin: String,
    pub node_bin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            evaluator: EvaluatorConfig::from_env()?,
            sandbox: SandboxConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

impl EvaluatorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            timeout_ms: parse_var("EVAL_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            timeout_grace_ms: parse_var("EVAL_TIMEOUT_GRACE_MS", DEFAULT_TIMEOUT_GRACE_MS)?,
            max_parallel_cases: parse_var("EVAL_MAX_PARALLEL_CASES", DEFAULT_MAX_PARALLEL_CASES)?,
        };

        if config.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("EVAL_TIMEOUT_MS".to_string()));
        }
        if config.max_parallel_cases == 0 {
            return Err(ConfigError::InvalidValue("EVAL_MAX_PARALLEL_CASES".to_string()));
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn timeout_grace(&self) -> Duration {
        Duration::from_millis(self.timeout_grace_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            timeout_grace_ms: DEFAULT_TIMEOUT_GRACE_MS,
            max_parallel_cases: DEFAULT_MAX_PARALLEL_CASES,
        }
    }
}

impl SandboxConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            work_root: env::var("SANDBOX_WORK_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join("codeassess")),
            memory_limit_mb: parse_var("SANDBOX_MEMORY_LIMIT_MB", DEFAULT_MEMORY_LIMIT_MB)?,
            max_output_bytes: parse_var("SANDBOX_MAX_OUTPUT_BYTES", DEFAULT_MAX_OUTPUT_BYTES)?,
            isolation: parse_var("SANDBOX_ISOLATION", true)?,
            max_processes: parse_var("SANDBOX_MAX_PROCESSES", DEFAULT_MAX_PROCESSES)?,
            python_bin: env::var("PYTHON_BIN").unwrap_or_else(|_| "python3".to_string()),
            node_bin: env::var("NODE_BIN").unwrap_or_else(|_| "node".to_string()),
        })
    }

    /// Address-space limit in bytes
    pub fn memory_limit_bytes(&self) -> u64 {
        self.memory_limit_mb * 1024 * 1024
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            work_root: env::temp_dir().join("codeassess"),
            memory_limit_mb: DEFAULT_MEMORY_LIMIT_MB,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            isolation: true,
            max_processes: DEFAULT_MAX_PROCESSES,
            python_bin: "python3".to_string(),
            node_bin: "node".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
