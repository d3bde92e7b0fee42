//! Typed executor over the string bridge
//!
//! `JsonExecutor` takes and returns `serde_json::Value`, turns engine status
//! codes into `BridgeError`, and knows how to load bundles from disk with an
//! optional serialized-script cache next to them.

use crate::error::{BridgeError, Result, StatusCode};
use crate::executor::BridgeExecutor;
use crate::spans;
use crate::traits::EngineHost;
use crate::types::BridgeResult;
use serde_json::Value;
use std::path::Path;

pub struct JsonExecutor<H: EngineHost> {
    executor: BridgeExecutor<H>,
}

fn check(operation: &'static str, status: StatusCode) -> Result<()> {
    status
        .into_result()
        .map_err(|code| BridgeError::Engine { operation, code })
}

fn parse_result(operation: &'static str, result: BridgeResult) -> Result<Value> {
    let text = result
        .into_result()
        .map_err(|code| BridgeError::Engine { operation, code })?;
    Ok(serde_json::from_str(&text)?)
}

fn require_array(args: &Value) -> Result<()> {
    if args.is_array() {
        Ok(())
    } else {
        Err(BridgeError::InvalidArgument(format!(
            "Bridge arguments must be a JSON array, got {}",
            args
        )))
    }
}

impl<H: EngineHost> JsonExecutor<H> {
    pub fn new(config: H::Config) -> Result<Self> {
        let executor = BridgeExecutor::initialize_host(config).map_err(|e| BridgeError::Engine {
            operation: "initialize_host",
            code: e.code,
        })?;
        Ok(Self { executor })
    }

    /// The string-level executor underneath.
    pub fn bridge(&self) -> &BridgeExecutor<H> {
        &self.executor
    }

    pub fn dispose(self) -> Result<()> {
        check("dispose_host", self.executor.dispose_host())
    }

    pub fn call_function_return_flushed_queue(
        &self,
        module_name: &str,
        method_name: &str,
        args: &Value,
    ) -> Result<Value> {
        require_array(args)?;
        let args_json = serde_json::to_string(args)?;
        parse_result(
            "call_function_and_return_flushed_queue",
            self.executor
                .call_function_and_return_flushed_queue(module_name, method_name, &args_json),
        )
    }

    pub fn invoke_callback_and_return_flushed_queue(
        &self,
        callback_id: i32,
        args: &Value,
    ) -> Result<Value> {
        require_array(args)?;
        let args_json = serde_json::to_string(args)?;
        parse_result(
            "invoke_callback_and_return_flushed_queue",
            self.executor
                .invoke_callback_and_return_flushed_queue(callback_id, &args_json),
        )
    }

    pub fn flushed_queue(&self) -> Result<Value> {
        parse_result("flushed_queue", self.executor.flushed_queue())
    }

    pub fn set_global_variable(&self, name: &str, value: &Value) -> Result<()> {
        let json_text = serde_json::to_string(value)?;
        check(
            "set_global_variable",
            self.executor.set_global_variable(name, &json_text),
        )
    }

    pub fn get_global_variable(&self, name: &str) -> Result<Value> {
        parse_result(
            "get_global_variable",
            self.executor.get_global_variable(name),
        )
    }

    pub fn run_script(&self, source: &str, source_url: &str) -> Result<()> {
        check("run_script", self.executor.run_script(source, source_url))
    }

    pub fn run_script_file(&self, path: &Path, source_url: &str) -> Result<()> {
        let span = spans::load_bundle(path, source_url);
        let _guard = span.enter();

        let source = std::fs::read_to_string(path)?;
        self.run_script(&source, source_url)
    }

    /// Precompile `source` and return the serialized form.
    pub fn serialize_script(&self, source: &str, source_url: &str) -> Result<Vec<u8>> {
        let mut serialized = Vec::new();
        check(
            "serialize_script",
            self.executor
                .serialize_script(source, source_url, &mut serialized),
        )?;
        Ok(serialized)
    }

    /// Run a bundle through its serialized form.
    ///
    /// `cache_path` is (re)written when it is missing or older than the bundle.
    pub fn run_script_with_cache(
        &self,
        path: &Path,
        cache_path: &Path,
        source_url: &str,
    ) -> Result<()> {
        let span = spans::load_bundle(path, source_url);
        let _guard = span.enter();

        let source = std::fs::read_to_string(path)?;

        let serialized = if cache_is_fresh(path, cache_path)? {
            tracing::debug!(cache = %cache_path.display(), "Using serialized script cache");
            std::fs::read(cache_path)?
        } else {
            tracing::debug!(cache = %cache_path.display(), "Writing serialized script cache");
            let serialized = self.serialize_script(&source, source_url)?;
            std::fs::write(cache_path, &serialized)?;
            serialized
        };

        check(
            "run_serialized_script",
            self.executor
                .run_serialized_script(&source, &serialized, source_url),
        )
    }
}

fn cache_is_fresh(bundle: &Path, cache_path: &Path) -> Result<bool> {
    let cache_meta = match std::fs::metadata(cache_path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    let bundle_modified = std::fs::metadata(bundle)?.modified()?;
    Ok(cache_meta.modified()? >= bundle_modified)
}
