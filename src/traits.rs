//! Engine collaborator contract
//!
//! The bridge never talks to a JavaScript engine directly. It goes through
//! two traits:
//! - [`JsEngine`]: value primitives available while an operation runs
//! - [`EngineHost`]: lifecycle of one engine instance and the entry point
//!   that runs an operation against it
//!
//! [`JavaScriptExecutor`] is the async surface offered to embedding hosts.
//!
//! Engine values (`JsEngine::Value`) never leave the closure handed to
//! [`EngineHost::execute`].

use crate::error::{EngineResult, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Value-level primitives of an embedded JavaScript engine.
///
/// Every call either succeeds and yields its output, or fails with the
/// engine's status code.
pub trait JsEngine {
    /// Engine value reference.
    type Value;

    /// The engine's global object.
    fn global_object(&self) -> EngineResult<Self::Value>;

    /// Read `name` from `object`. A missing property yields `undefined`,
    /// a non-object receiver is a lookup failure.
    fn get_property(&self, object: &Self::Value, name: &str) -> EngineResult<Self::Value>;

    fn set_property(&self, object: &Self::Value, name: &str, value: &Self::Value)
    -> EngineResult<()>;

    /// Call `function`. `args[0]` is the receiver (`this`), the remaining
    /// entries are the positional arguments.
    fn call_function(&self, function: &Self::Value, args: &[&Self::Value])
    -> EngineResult<Self::Value>;

    /// Build an engine string from host text. The whole slice is used,
    /// embedded NUL characters included.
    fn pointer_to_string(&self, text: &str) -> EngineResult<Self::Value>;

    /// Read an engine string back into an owned host string.
    fn string_to_pointer(&self, value: &Self::Value) -> EngineResult<String>;

    fn int_to_number(&self, value: i32) -> EngineResult<Self::Value>;

    /// Parse an engine string holding JSON text into a structured value.
    fn json_parse(&self, text: &Self::Value) -> EngineResult<Self::Value>;

    /// Serialize a value into an engine string holding JSON text. Values
    /// with no JSON form (`undefined`, functions) are a conversion failure.
    fn json_stringify(&self, value: &Self::Value) -> EngineResult<Self::Value>;

    fn run_script(&self, source: &str, source_uri: &str) -> EngineResult<Self::Value>;

    /// Produce a precompiled form of `source`. Engines that bake the script
    /// name into the compiled form record `source_uri` there.
    fn serialize_script(&self, source: &str, source_uri: &str) -> EngineResult<Vec<u8>>;

    /// Run a precompiled form. Falling back to `source` when `serialized`
    /// cannot be loaded is up to the implementation.
    fn run_serialized_script(
        &self,
        source: &str,
        serialized: &[u8],
        source_uri: &str,
    ) -> EngineResult<Self::Value>;

    fn get_global_variable(&self, name: &str) -> EngineResult<Self::Value> {
        let global = self.global_object()?;
        self.get_property(&global, name)
    }

    fn set_global_variable(&self, name: &str, value: &Self::Value) -> EngineResult<()> {
        let global = self.global_object()?;
        self.set_property(&global, name, value)
    }
}

/// One engine instance: created by [`EngineHost::init`], released by
/// [`EngineHost::destroy`].
pub trait EngineHost: Sized {
    /// Settings used to create the engine.
    type Config;

    type Engine: JsEngine;

    fn init(config: Self::Config) -> EngineResult<Self>;

    /// Run `op` against the engine and wait for it to finish.
    fn execute<R, F>(&self, op: F) -> R
    where
        F: FnOnce(&Self::Engine) -> R + Send + 'static,
        R: Send + 'static;

    /// Tear the engine down. The host is consumed whether or not the engine
    /// reports an error.
    fn destroy(self) -> EngineResult<()>;
}

/// Async executor surface for hosts that share one bridge across tasks.
#[async_trait]
pub trait JavaScriptExecutor: Send + Sync {
    async fn call_function_return_flushed_queue(
        &self,
        module_name: &str,
        method_name: &str,
        args: &Value,
    ) -> Result<Value>;

    async fn invoke_callback_and_return_flushed_queue(
        &self,
        callback_id: i32,
        args: &Value,
    ) -> Result<Value>;

    async fn flushed_queue(&self) -> Result<Value>;

    async fn set_global_variable(&self, name: &str, value: &Value) -> Result<()>;

    async fn get_global_variable(&self, name: &str) -> Result<Value>;

    async fn run_script(&self, source: &str, source_url: &str) -> Result<()>;
}
