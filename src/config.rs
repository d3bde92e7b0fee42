//! QuickJS engine configuration

use crate::error::{BridgeError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration for the QuickJS engine host
///
/// These options map directly to the available options in `quickjs_runtime::builder::QuickJsRuntimeBuilder`.
/// Loadable from JSON, e.g. `{"memory_limit": 67108864, "gc_interval_ms": 30000}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum memory limit in bytes (None = no limit)
    pub memory_limit: Option<u64>,

    /// Maximum stack size in bytes (None = default)
    pub max_stack_size: Option<u64>,

    /// Number of allocations before garbage collection runs (None = default)
    pub gc_threshold: Option<u64>,

    /// Full GC interval in milliseconds (None = disabled)
    pub gc_interval_ms: Option<u64>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set memory limit in bytes
    pub fn with_memory_limit(mut self, limit: Option<u64>) -> Self {
        self.memory_limit = limit;
        self
    }

    /// Set maximum stack size in bytes
    pub fn with_max_stack_size(mut self, size: Option<u64>) -> Self {
        self.max_stack_size = size;
        self
    }

    /// Set garbage collection threshold (number of allocations before GC runs)
    pub fn with_gc_threshold(mut self, threshold: Option<u64>) -> Self {
        self.gc_threshold = threshold;
        self
    }

    /// Set garbage collection interval
    ///
    /// This will start a timer thread which triggers a full GC every set interval.
    pub fn with_gc_interval(mut self, interval: Option<Duration>) -> Self {
        self.gc_interval_ms = interval.map(|d| d.as_millis() as u64);
        self
    }

    pub fn gc_interval(&self) -> Option<Duration> {
        self.gc_interval_ms.map(Duration::from_millis)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BridgeError::Config(format!("Invalid engine configuration: {}", e)))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
