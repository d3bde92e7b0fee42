//! Runtime builder and configuration
//!
//! Provides a builder pattern for creating a bridge executor, seeding its
//! globals and loading a bundle, then sharing it between async tasks.

use crate::config::EngineConfig;
use crate::error::{BridgeError, Result};
use crate::json_executor::JsonExecutor;
use crate::quickjs_engine::QuickJsHost;
use crate::traits::{EngineHost, JavaScriptExecutor};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Bundle loaded into the engine when the runtime is built
#[derive(Debug, Clone)]
pub struct BundleSource {
    /// Path of the JavaScript bundle on disk
    pub path: PathBuf,

    /// URL reported to the engine for diagnostics
    pub source_url: String,

    /// Serialized-script cache file (None = run the source directly)
    pub cache_path: Option<PathBuf>,
}

/// Built runtime environment
pub struct Runtime<H: EngineHost = QuickJsHost> {
    executor: Arc<Mutex<JsonExecutor<H>>>,
    bundle: Option<BundleSource>,
}

impl<H: EngineHost> Runtime<H> {
    /// Get the shared executor
    pub fn executor(&self) -> Arc<Mutex<JsonExecutor<H>>> {
        self.executor.clone()
    }

    /// Bundle loaded at build time, if any
    pub fn bundle(&self) -> Option<&BundleSource> {
        self.bundle.as_ref()
    }

    /// Dispose the engine host.
    ///
    /// Fails if handles returned by [`Runtime::executor`] are still alive.
    pub fn dispose(self) -> Result<()> {
        let executor = Arc::try_unwrap(self.executor).map_err(|_| {
            BridgeError::InvalidArgument(
                "Cannot dispose runtime while its executor is still shared".to_string(),
            )
        })?;
        executor.into_inner().dispose()
    }
}

#[async_trait]
impl<H> JavaScriptExecutor for Runtime<H>
where
    H: EngineHost + Send + 'static,
{
    async fn call_function_return_flushed_queue(
        &self,
        module_name: &str,
        method_name: &str,
        args: &Value,
    ) -> Result<Value> {
        let executor = self.executor.lock().await;
        executor.call_function_return_flushed_queue(module_name, method_name, args)
    }

    async fn invoke_callback_and_return_flushed_queue(
        &self,
        callback_id: i32,
        args: &Value,
    ) -> Result<Value> {
        let executor = self.executor.lock().await;
        executor.invoke_callback_and_return_flushed_queue(callback_id, args)
    }

    async fn flushed_queue(&self) -> Result<Value> {
        let executor = self.executor.lock().await;
        executor.flushed_queue()
    }

    async fn set_global_variable(&self, name: &str, value: &Value) -> Result<()> {
        let executor = self.executor.lock().await;
        executor.set_global_variable(name, value)
    }

    async fn get_global_variable(&self, name: &str) -> Result<Value> {
        let executor = self.executor.lock().await;
        executor.get_global_variable(name)
    }

    async fn run_script(&self, source: &str, source_url: &str) -> Result<()> {
        let executor = self.executor.lock().await;
        executor.run_script(source, source_url)
    }
}

/// Builder for constructing a runtime environment
pub struct RuntimeBuilder<H: EngineHost = QuickJsHost> {
    host_config: H::Config,
    globals: Vec<(String, Value)>,
    bundle: Option<(PathBuf, String)>,
    cache_path: Option<PathBuf>,
}

impl RuntimeBuilder<QuickJsHost> {
    /// Create a new runtime builder with default QuickJS configuration
    pub fn new() -> Self {
        Self::with_host_config(EngineConfig::default())
    }

    /// Configure QuickJS runtime options
    ///
    /// This allows fine-grained control over the QuickJS runtime behavior,
    /// including memory limits, stack size, and garbage collection settings.
    ///
    /// # Example
    /// ```rust,no_run
    /// use batched_bridge::{EngineConfig, RuntimeBuilder};
    /// use std::time::Duration;
    ///
    /// let runtime = RuntimeBuilder::new()
    ///     .with_engine_config(
    ///         EngineConfig::new()
    ///             .with_memory_limit(Some(64 * 1024 * 1024)) // 64MB limit
    ///             .with_max_stack_size(Some(1024 * 1024)) // 1MB stack
    ///             .with_gc_interval(Some(Duration::from_secs(30))) // GC every 30 seconds
    ///     )
    ///     .with_bundle("index.bundle.js", "http://localhost/index.bundle")
    ///     .build()?;
    /// # Ok::<(), batched_bridge::BridgeError>(())
    /// ```
    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.host_config = config;
        self
    }
}

impl Default for RuntimeBuilder<QuickJsHost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: EngineHost> RuntimeBuilder<H> {
    /// Create a builder for any engine host
    pub fn with_host_config(host_config: H::Config) -> Self {
        Self {
            host_config,
            globals: Vec::new(),
            bundle: None,
            cache_path: None,
        }
    }

    /// Set a global variable before the bundle runs
    pub fn with_global(mut self, name: impl Into<String>, value: Value) -> Self {
        self.globals.push((name.into(), value));
        self
    }

    /// Load a bundle from disk once the globals are in place
    pub fn with_bundle(mut self, path: impl Into<PathBuf>, source_url: impl Into<String>) -> Self {
        self.bundle = Some((path.into(), source_url.into()));
        self
    }

    /// Run the bundle through a serialized-script cache file
    pub fn with_script_cache(mut self, cache_path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(cache_path.into());
        self
    }

    /// Build the runtime environment
    pub fn build(self) -> Result<Runtime<H>> {
        tracing::info!(
            globals = self.globals.len(),
            has_bundle = self.bundle.is_some(),
            "Building runtime environment"
        );

        if self.cache_path.is_some() && self.bundle.is_none() {
            return Err(BridgeError::Config(
                "A script cache requires a bundle".to_string(),
            ));
        }

        let executor = JsonExecutor::<H>::new(self.host_config)?;

        let loaded = apply_setup(&executor, &self.globals, self.bundle, self.cache_path);
        let bundle = match loaded {
            Ok(bundle) => bundle,
            Err(e) => {
                // The host must not outlive a failed build.
                if let Err(dispose_err) = executor.dispose() {
                    tracing::warn!(error = %dispose_err, "Dispose after failed build reported an error");
                }
                return Err(e);
            }
        };

        Ok(Runtime {
            executor: Arc::new(Mutex::new(executor)),
            bundle,
        })
    }
}

fn apply_setup<H: EngineHost>(
    executor: &JsonExecutor<H>,
    globals: &[(String, Value)],
    bundle: Option<(PathBuf, String)>,
    cache_path: Option<PathBuf>,
) -> Result<Option<BundleSource>> {
    for (name, value) in globals {
        executor.set_global_variable(name, value)?;
    }

    let Some((path, source_url)) = bundle else {
        return Ok(None);
    };

    match &cache_path {
        Some(cache) => executor.run_script_with_cache(&path, cache, &source_url)?,
        None => executor.run_script_file(&path, &source_url)?,
    }

    Ok(Some(BundleSource {
        path,
        source_url,
        cache_path,
    }))
}
