//! Batched bridge between a host application and an embedded JavaScript engine
//!
//! This crate exposes a JavaScript engine through a narrow, string-oriented
//! interface: run scripts, exchange globals as JSON text, and drive the
//! `__fbBatchedBridge` protocol (call module method, invoke callback, flush
//! queue).

pub mod batched_bridge;
pub mod config;
pub mod error;
pub mod executor;
pub mod js_value_converter;
pub mod json_executor;
pub mod quickjs_engine;
pub mod runtime;
pub mod spans;
pub mod tracing_setup;
pub mod traits;
pub mod types;

pub use batched_bridge::{BATCHED_BRIDGE, BatchedBridge, BridgeMethod};
pub use config::EngineConfig;
pub use error::{BridgeError, EngineError, EngineResult, ErrorCategory, Result, StatusCode};
pub use executor::BridgeExecutor;
pub use json_executor::JsonExecutor;
pub use quickjs_engine::QuickJsHost;
pub use runtime::{BundleSource, Runtime, RuntimeBuilder};
pub use traits::{EngineHost, JavaScriptExecutor, JsEngine};
pub use types::BridgeResult;
