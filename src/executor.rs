//! Bridge executor
//!
//! Owns one engine host and exposes the string-oriented bridge surface:
//! lifecycle, script execution, global variables and the three batched
//! bridge protocol calls.
//!
//! A `BridgeExecutor` only exists while its host is ready. `initialize_host`
//! is the only way to get one and `dispose_host` consumes it, so no operation
//! can reach an uninitialized or disposed host.

use crate::batched_bridge::{BatchedBridge, BridgeMethod};
use crate::error::{EngineError, EngineResult, StatusCode};
use crate::js_value_converter::{text_to_json_value, to_engine_string, value_to_json_text};
use crate::spans;
use crate::traits::{EngineHost, JsEngine};
use crate::types::BridgeResult;

pub struct BridgeExecutor<H: EngineHost> {
    host: H,
}

impl<H: EngineHost> BridgeExecutor<H> {
    /// Create the engine host. On failure nothing is kept alive.
    pub fn initialize_host(config: H::Config) -> EngineResult<Self> {
        let span = spans::initialize_host();
        let _guard = span.enter();

        let host = H::init(config).inspect_err(|e| {
            tracing::warn!(code = %e.code, message = %e.message, "Engine initialization failed");
        })?;
        tracing::info!("Engine host ready");
        Ok(Self { host })
    }

    /// Destroy the engine host. The handle is released even when the engine
    /// reports an error; that error's code is returned.
    pub fn dispose_host(self) -> StatusCode {
        let span = spans::dispose_host();
        let _guard = span.enter();

        match self.host.destroy() {
            Ok(()) => {
                tracing::info!("Engine host disposed");
                StatusCode::Success
            }
            Err(e) => {
                tracing::warn!(code = %e.code, message = %e.message, "Engine destroy reported an error");
                e.code
            }
        }
    }

    /// Parse `json_text` and bind it to the global `name`.
    pub fn set_global_variable(&self, name: &str, json_text: &str) -> StatusCode {
        let span = spans::set_global_variable(name);
        let _guard = span.enter();

        let name = name.to_string();
        let json_text = json_text.to_string();
        let result = self.host.execute(move |engine| {
            let value = text_to_json_value(engine, &json_text)?;
            engine.set_global_variable(&name, &value)
        });
        status_of("set_global_variable", result)
    }

    /// Read the global `name` as JSON text.
    pub fn get_global_variable(&self, name: &str) -> BridgeResult {
        let span = spans::get_global_variable(name);
        let _guard = span.enter();

        let name = name.to_string();
        let result = self.host.execute(move |engine| {
            let value = engine.get_global_variable(&name)?;
            value_to_json_text(engine, &value)
        });
        bridge_result_of("get_global_variable", result)
    }

    /// Run `source` as a program. The completion value is discarded.
    pub fn run_script(&self, source: &str, source_uri: &str) -> StatusCode {
        let span = spans::run_script(source_uri, source.len());
        let _guard = span.enter();

        let source = source.to_string();
        let source_uri = source_uri.to_string();
        let result = self
            .host
            .execute(move |engine| engine.run_script(&source, &source_uri).map(drop));
        status_of("run_script", result)
    }

    /// Precompile `source` into `out`. `out` is only written on success.
    /// `source_uri` names the script in errors and stack traces raised when
    /// the bytecode later runs.
    pub fn serialize_script(
        &self,
        source: &str,
        source_uri: &str,
        out: &mut Vec<u8>,
    ) -> StatusCode {
        let span = spans::serialize_script(source_uri, source.len());
        let _guard = span.enter();

        let source = source.to_string();
        let source_uri = source_uri.to_string();
        let result = self
            .host
            .execute(move |engine| engine.serialize_script(&source, &source_uri));
        match result {
            Ok(serialized) => {
                *out = serialized;
                StatusCode::Success
            }
            Err(e) => status_of("serialize_script", Err(e)),
        }
    }

    /// Run a precompiled script. The completion value is discarded.
    pub fn run_serialized_script(
        &self,
        source: &str,
        serialized: &[u8],
        source_uri: &str,
    ) -> StatusCode {
        let span = spans::run_serialized_script(source_uri, serialized.len());
        let _guard = span.enter();

        let source = source.to_string();
        let serialized = serialized.to_vec();
        let source_uri = source_uri.to_string();
        let result = self.host.execute(move |engine| {
            engine
                .run_serialized_script(&source, &serialized, &source_uri)
                .map(drop)
        });
        status_of("run_serialized_script", result)
    }

    /// Invoke `__fbBatchedBridge.callFunctionReturnFlushedQueue` with
    /// `(global, module_name, method_name, JSON.parse(args_json))` and return
    /// the flushed queue as JSON text.
    pub fn call_function_and_return_flushed_queue(
        &self,
        module_name: &str,
        method_name: &str,
        args_json: &str,
    ) -> BridgeResult {
        let span = spans::call_function(module_name, method_name);
        let _guard = span.enter();

        let module_name = module_name.to_string();
        let method_name = method_name.to_string();
        let args_json = args_json.to_string();
        let result = self.host.execute(move |engine| {
            call_function_return_flushed_queue(engine, &module_name, &method_name, &args_json)
        });
        bridge_result_of("call_function_and_return_flushed_queue", result)
    }

    /// Invoke `__fbBatchedBridge.invokeCallbackAndReturnFlushedQueue` with
    /// `(global, callback_id, JSON.parse(args_json))`.
    pub fn invoke_callback_and_return_flushed_queue(
        &self,
        callback_id: i32,
        args_json: &str,
    ) -> BridgeResult {
        let span = spans::invoke_callback(callback_id);
        let _guard = span.enter();

        let args_json = args_json.to_string();
        let result = self.host.execute(move |engine| {
            invoke_callback_return_flushed_queue(engine, callback_id, &args_json)
        });
        bridge_result_of("invoke_callback_and_return_flushed_queue", result)
    }

    /// Invoke `__fbBatchedBridge.flushedQueue` with `(global)`.
    pub fn flushed_queue(&self) -> BridgeResult {
        let span = spans::flushed_queue();
        let _guard = span.enter();

        let result = self.host.execute(|engine| flushed_queue(engine));
        bridge_result_of("flushed_queue", result)
    }
}

fn call_function_return_flushed_queue<E: JsEngine>(
    engine: &E,
    module_name: &str,
    method_name: &str,
    args_json: &str,
) -> EngineResult<String> {
    let bridge = BatchedBridge::resolve(engine)?;
    let method = bridge.method(BridgeMethod::CallFunctionReturnFlushedQueue)?;

    let module_name = to_engine_string(engine, module_name)?;
    let method_name = to_engine_string(engine, method_name)?;
    let args = text_to_json_value(engine, args_json)?;

    let result = bridge.call(&method, &[&module_name, &method_name, &args])?;
    value_to_json_text(engine, &result)
}

fn invoke_callback_return_flushed_queue<E: JsEngine>(
    engine: &E,
    callback_id: i32,
    args_json: &str,
) -> EngineResult<String> {
    let bridge = BatchedBridge::resolve(engine)?;
    let method = bridge.method(BridgeMethod::InvokeCallbackAndReturnFlushedQueue)?;

    let callback_id = engine.int_to_number(callback_id)?;
    let args = text_to_json_value(engine, args_json)?;

    let result = bridge.call(&method, &[&callback_id, &args])?;
    value_to_json_text(engine, &result)
}

fn flushed_queue<E: JsEngine>(engine: &E) -> EngineResult<String> {
    let bridge = BatchedBridge::resolve(engine)?;
    let result = bridge.invoke(BridgeMethod::FlushedQueue, &[])?;
    value_to_json_text(engine, &result)
}

fn log_failure(operation: &'static str, err: &EngineError) {
    tracing::debug!(
        operation = operation,
        code = %err.code,
        message = %err.message,
        "Bridge operation failed"
    );
}

fn status_of(operation: &'static str, result: EngineResult<()>) -> StatusCode {
    match result {
        Ok(()) => StatusCode::Success,
        Err(e) => {
            log_failure(operation, &e);
            e.code
        }
    }
}

fn bridge_result_of(operation: &'static str, result: EngineResult<String>) -> BridgeResult {
    if let Err(e) = &result {
        log_failure(operation, e);
    }
    BridgeResult::from(result)
}
