use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SandboxConfig;

use super::adapter::ExecutionAdapter;
use super::languages::{JavaScriptAdapter, PythonAdapter};
use super::sandbox::ProcessSandbox;

/// Language id → execution adapter.
///
/// A language missing here may still be declared by problems; its submissions
/// are reported as not executed.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<&'static str, Arc<dyn ExecutionAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every adapter this build ships, sharing one sandbox
    pub fn with_default_adapters(sandbox: Arc<ProcessSandbox>, config: &SandboxConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PythonAdapter::new(Arc::clone(&sandbox), config)));
        registry.register(Arc::new(JavaScriptAdapter::new(sandbox, config)));
        registry
    }

    /// Add or replace the adapter for its language
    pub fn register(&mut self, adapter: Arc<dyn ExecutionAdapter>) {
        if let Some(previous) = self.adapters.insert(adapter.language(), adapter) {
            tracing::warn!("Replaced execution adapter for {}", previous.language());
        }
    }

    pub fn get(&self, language: &str) -> Option<Arc<dyn ExecutionAdapter>> {
        self.adapters.get(language).cloned()
    }

    /// Languages with a working adapter, sorted
    pub fn languages(&self) -> Vec<&'static str> {
        let mut languages: Vec<_> = self.adapters.keys().copied().collect();
        languages.sort_unstable();
        languages
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
