//! QuickJS engine host
//!
//! Implements the engine collaborator contract on top of `quickjs_runtime`.
//! Operations run on the QuickJS event-loop thread through
//! `QuickJsRuntimeFacade::loop_realm_sync`, so engine values never leave
//! that thread.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, StatusCode};
use crate::traits::{EngineHost, JsEngine};
use quickjs_runtime::builder::QuickJsRuntimeBuilder;
use quickjs_runtime::facades::QuickJsRuntimeFacade;
use quickjs_runtime::jsutils::JsError;
use quickjs_runtime::quickjs_utils::json;
use quickjs_runtime::quickjsrealmadapter::QuickJsRealmAdapter;
use quickjs_runtime::quickjsvalueadapter::QuickJsValueAdapter;

mod raw;

/// Where an engine error surfaced. Decides how a `SyntaxError` is reported.
#[derive(Debug, Clone, Copy)]
enum Phase {
    Compile,
    JsonParse,
    Call,
}

fn engine_error(err: &JsError, phase: Phase) -> EngineError {
    let code = match (err.get_name(), err.get_message()) {
        ("InternalError", "out of memory") => StatusCode::OutOfMemory,
        ("InternalError", "interrupted") => StatusCode::ScriptTerminated,
        ("SyntaxError", _) => match phase {
            Phase::Compile => StatusCode::ScriptCompile,
            Phase::JsonParse => StatusCode::JsonParse,
            Phase::Call => StatusCode::ScriptException,
        },
        _ => StatusCode::ScriptException,
    };
    EngineError::new(code, err.to_string())
}

impl JsEngine for QuickJsRealmAdapter {
    type Value = QuickJsValueAdapter;

    fn global_object(&self) -> EngineResult<QuickJsValueAdapter> {
        self.get_global().map_err(|e| engine_error(&e, Phase::Call))
    }

    fn get_property(
        &self,
        object: &QuickJsValueAdapter,
        name: &str,
    ) -> EngineResult<QuickJsValueAdapter> {
        if !object.is_object() {
            return Err(EngineError::new(
                StatusCode::ArgumentNotObject,
                format!("Cannot read property '{}' of a non-object", name),
            ));
        }
        self.get_object_property(object, name)
            .map_err(|e| engine_error(&e, Phase::Call))
    }

    fn set_property(
        &self,
        object: &QuickJsValueAdapter,
        name: &str,
        value: &QuickJsValueAdapter,
    ) -> EngineResult<()> {
        if !object.is_object() {
            return Err(EngineError::new(
                StatusCode::ArgumentNotObject,
                format!("Cannot set property '{}' on a non-object", name),
            ));
        }
        self.set_object_property(object, name, value)
            .map_err(|e| engine_error(&e, Phase::Call))
    }

    fn call_function(
        &self,
        function: &QuickJsValueAdapter,
        args: &[&QuickJsValueAdapter],
    ) -> EngineResult<QuickJsValueAdapter> {
        if !function.is_function() {
            return Err(EngineError::new(
                StatusCode::ArgumentNotFunction,
                "Value is not a function",
            ));
        }
        let (this, rest) = args.split_first().ok_or_else(|| {
            EngineError::new(StatusCode::InvalidArgument, "Missing call receiver")
        })?;
        self.invoke_function(Some(*this), function, rest)
            .map_err(|e| engine_error(&e, Phase::Call))
    }

    fn pointer_to_string(&self, text: &str) -> EngineResult<QuickJsValueAdapter> {
        self.create_string(text)
            .map_err(|e| EngineError::new(StatusCode::InvalidArgument, e.to_string()))
    }

    fn string_to_pointer(&self, value: &QuickJsValueAdapter) -> EngineResult<String> {
        raw::read_string(self, value)
            .map_err(|e| EngineError::new(StatusCode::InvalidArgument, e.to_string()))
    }

    fn int_to_number(&self, value: i32) -> EngineResult<QuickJsValueAdapter> {
        self.create_i32(value)
            .map_err(|e| EngineError::new(StatusCode::InvalidArgument, e.to_string()))
    }

    /// Runs the realm's own `JSON.parse` on the engine string, so the text
    /// never round-trips through a C string.
    fn json_parse(&self, text: &QuickJsValueAdapter) -> EngineResult<QuickJsValueAdapter> {
        if !text.is_string() {
            return Err(EngineError::new(
                StatusCode::InvalidArgument,
                "JSON.parse input is not a string",
            ));
        }
        let global = JsEngine::global_object(self)?;
        let json_object = JsEngine::get_property(self, &global, "JSON")?;
        let parse = JsEngine::get_property(self, &json_object, "parse")?;
        self.invoke_function(Some(&json_object), &parse, &[text])
            .map_err(|e| engine_error(&e, Phase::JsonParse))
    }

    fn json_stringify(&self, value: &QuickJsValueAdapter) -> EngineResult<QuickJsValueAdapter> {
        let stringified =
            json::stringify_q(self, value, None).map_err(|e| engine_error(&e, Phase::Call))?;
        if !stringified.is_string() {
            return Err(EngineError::new(
                StatusCode::InvalidArgument,
                "Value has no JSON representation",
            ));
        }
        Ok(stringified)
    }

    /// Compiles first so that only parse errors count as `ScriptCompile`.
    fn run_script(&self, source: &str, source_uri: &str) -> EngineResult<QuickJsValueAdapter> {
        let compiled = raw::compile_script(self, source, source_uri)
            .map_err(|e| engine_error(&e, Phase::Compile))?;
        raw::run_compiled(self, &compiled).map_err(|e| engine_error(&e, Phase::Call))
    }

    fn serialize_script(&self, source: &str, source_uri: &str) -> EngineResult<Vec<u8>> {
        let compiled = raw::compile_script(self, source, source_uri)
            .map_err(|e| engine_error(&e, Phase::Compile))?;
        raw::write_bytecode(self, &compiled).map_err(|e| engine_error(&e, Phase::Compile))
    }

    /// Falls back to `source` when `serialized` cannot be loaded as a
    /// compiled script. Bytecode keeps the script name it was serialized
    /// with; `source_uri` only names the fallback.
    fn run_serialized_script(
        &self,
        source: &str,
        serialized: &[u8],
        source_uri: &str,
    ) -> EngineResult<QuickJsValueAdapter> {
        match raw::read_bytecode(self, serialized) {
            Ok(compiled) => {
                raw::run_compiled(self, &compiled).map_err(|e| engine_error(&e, Phase::Call))
            }
            Err(e) => {
                tracing::debug!(
                    source_uri = source_uri,
                    error = %e,
                    "Serialized script rejected, falling back to source"
                );
                JsEngine::run_script(self, source, source_uri)
            }
        }
    }
}

/// QuickJS runtime owned by a bridge executor.
pub struct QuickJsHost {
    runtime: QuickJsRuntimeFacade,
}

impl EngineHost for QuickJsHost {
    type Config = EngineConfig;
    type Engine = QuickJsRealmAdapter;

    fn init(config: EngineConfig) -> EngineResult<Self> {
        tracing::info!(
            memory_limit = ?config.memory_limit,
            max_stack_size = ?config.max_stack_size,
            gc_threshold = ?config.gc_threshold,
            gc_interval = ?config.gc_interval(),
            "Initializing QuickJS runtime with configuration"
        );

        let mut builder = QuickJsRuntimeBuilder::new();

        if let Some(limit) = config.memory_limit {
            builder = builder.memory_limit(limit);
        }

        if let Some(stack_size) = config.max_stack_size {
            builder = builder.max_stack_size(stack_size);
        }

        if let Some(threshold) = config.gc_threshold {
            builder = builder.gc_threshold(threshold);
        }

        if let Some(interval) = config.gc_interval() {
            builder = builder.gc_interval(interval);
        }

        let runtime = builder.build();

        // The default realm must hand out a global object before the host
        // counts as ready.
        runtime.loop_realm_sync(None, |_rt, realm| {
            JsEngine::global_object(realm).map(drop).map_err(|e| {
                EngineError::new(
                    StatusCode::Fatal,
                    format!("QuickJS realm unavailable: {}", e.message),
                )
            })
        })?;

        Ok(Self { runtime })
    }

    fn execute<R, F>(&self, op: F) -> R
    where
        F: FnOnce(&QuickJsRealmAdapter) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.runtime.loop_realm_sync(None, move |_rt, realm| op(realm))
    }

    fn destroy(self) -> EngineResult<()> {
        // Dropping the facade stops the event loop and frees the runtime.
        drop(self.runtime);
        Ok(())
    }
}
