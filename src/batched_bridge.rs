//! Typed access to the JavaScript-side batched bridge
//!
//! The JavaScript side installs a global `__fbBatchedBridge` object. Native
//! code drives it through three members whose names and argument order are
//! part of the protocol and must not change.

use crate::error::EngineResult;
use crate::traits::JsEngine;

/// Global name of the batched bridge object.
pub const BATCHED_BRIDGE: &str = "__fbBatchedBridge";

/// Protocol members of the batched bridge object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeMethod {
    /// `(global, moduleName, methodName, args)`
    CallFunctionReturnFlushedQueue,
    /// `(global, callbackId, args)`
    InvokeCallbackAndReturnFlushedQueue,
    /// `(global)`
    FlushedQueue,
}

impl BridgeMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            BridgeMethod::CallFunctionReturnFlushedQueue => "callFunctionReturnFlushedQueue",
            BridgeMethod::InvokeCallbackAndReturnFlushedQueue => {
                "invokeCallbackAndReturnFlushedQueue"
            }
            BridgeMethod::FlushedQueue => "flushedQueue",
        }
    }
}

/// The batched bridge object resolved for a single protocol call.
pub struct BatchedBridge<'e, E: JsEngine> {
    engine: &'e E,
    global: E::Value,
    object: E::Value,
}

impl<'e, E: JsEngine> BatchedBridge<'e, E> {
    /// Look up the global object and the bridge object hanging off it.
    pub fn resolve(engine: &'e E) -> EngineResult<Self> {
        let global = engine.global_object()?;
        let object = engine.get_property(&global, BATCHED_BRIDGE)?;
        Ok(Self {
            engine,
            global,
            object,
        })
    }

    pub fn global(&self) -> &E::Value {
        &self.global
    }

    /// Resolve one member of the bridge object.
    pub fn method(&self, method: BridgeMethod) -> EngineResult<E::Value> {
        self.engine.get_property(&self.object, method.as_str())
    }

    /// Call a resolved member with the global object as receiver, followed
    /// by `args`.
    pub fn call(&self, function: &E::Value, args: &[&E::Value]) -> EngineResult<E::Value> {
        let mut call_args: Vec<&E::Value> = Vec::with_capacity(args.len() + 1);
        call_args.push(&self.global);
        call_args.extend_from_slice(args);
        tracing::trace!(argc = call_args.len(), "Invoking batched bridge member");
        self.engine.call_function(function, &call_args)
    }

    /// Resolve `method` and [`call`](Self::call) it.
    pub fn invoke(&self, method: BridgeMethod, args: &[&E::Value]) -> EngineResult<E::Value> {
        let function = self.method(method)?;
        tracing::trace!(method = method.as_str(), "Resolved batched bridge member");
        self.call(&function, args)
    }
}
