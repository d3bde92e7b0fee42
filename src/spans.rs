//! Span helpers for bridge operations
//!
//! All span names use the `batched_bridge.` prefix. Lifecycle spans are at
//! info level, per-call spans at debug level.

use std::path::Path;
use tracing::Span;

// Lifecycle

#[inline]
pub fn initialize_host() -> Span {
    tracing::info_span!("batched_bridge.initialize_host")
}

#[inline]
pub fn dispose_host() -> Span {
    tracing::info_span!("batched_bridge.dispose_host")
}

/// Create span for loading a bundle from disk.
///
/// Children: serialize_script, run_serialized_script or run_script
#[inline]
pub fn load_bundle(bundle: &Path, source_url: &str) -> Span {
    tracing::info_span!(
        "batched_bridge.load_bundle",
        bundle = %bundle.display(),
        source_url = source_url,
    )
}

// Script execution

#[inline]
pub fn run_script(source_uri: &str, source_len: usize) -> Span {
    tracing::debug_span!(
        "batched_bridge.run_script",
        source_uri = source_uri,
        source_len = source_len,
    )
}

#[inline]
pub fn serialize_script(source_uri: &str, source_len: usize) -> Span {
    tracing::debug_span!(
        "batched_bridge.serialize_script",
        source_uri = source_uri,
        source_len = source_len
    )
}

#[inline]
pub fn run_serialized_script(source_uri: &str, serialized_len: usize) -> Span {
    tracing::debug_span!(
        "batched_bridge.run_serialized_script",
        source_uri = source_uri,
        serialized_len = serialized_len,
    )
}

// Globals

#[inline]
pub fn set_global_variable(name: &str) -> Span {
    tracing::debug_span!("batched_bridge.set_global_variable", name = name)
}

#[inline]
pub fn get_global_variable(name: &str) -> Span {
    tracing::debug_span!("batched_bridge.get_global_variable", name = name)
}

// Protocol calls

#[inline]
pub fn call_function(module_name: &str, method_name: &str) -> Span {
    tracing::debug_span!(
        "batched_bridge.call_function",
        module = module_name,
        method = method_name,
    )
}

#[inline]
pub fn invoke_callback(callback_id: i32) -> Span {
    tracing::debug_span!("batched_bridge.invoke_callback", callback_id = callback_id)
}

#[inline]
pub fn flushed_queue() -> Span {
    tracing::debug_span!("batched_bridge.flushed_queue")
}
