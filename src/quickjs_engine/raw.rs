//! Unchecked QuickJS calls
//!
//! Every `unsafe` call into QuickJS is in this module. Each function takes
//! the realm it works on: a `QuickJsRealmAdapter` is only handed out on its
//! event-loop thread while its context is alive, which is exactly what the
//! calls below require of `realm.context`.

use quickjs_runtime::jsutils::{JsError, Script};
use quickjs_runtime::libquickjs_sys as q;
use quickjs_runtime::quickjs_utils::compile;
use quickjs_runtime::quickjsrealmadapter::QuickJsRealmAdapter;
use quickjs_runtime::quickjsvalueadapter::QuickJsValueAdapter;

/// Compile a global script without running it.
pub(super) fn compile_script(
    realm: &QuickJsRealmAdapter,
    source: &str,
    source_uri: &str,
) -> Result<QuickJsValueAdapter, JsError> {
    // SAFETY: live context, event-loop thread (module docs).
    unsafe { compile::compile(realm.context, Script::new(source_uri, source)) }
}

pub(super) fn run_compiled(
    realm: &QuickJsRealmAdapter,
    compiled: &QuickJsValueAdapter,
) -> Result<QuickJsValueAdapter, JsError> {
    // `run_compiled_function` asserts on anything else.
    if !compiled.is_compiled_function() {
        return Err(JsError::new_str("value is not a compiled script"));
    }
    // SAFETY: live context, event-loop thread (module docs).
    unsafe { compile::run_compiled_function(realm.context, compiled) }
}

pub(super) fn write_bytecode(
    realm: &QuickJsRealmAdapter,
    compiled: &QuickJsValueAdapter,
) -> Result<Vec<u8>, JsError> {
    if !compiled.is_compiled_function() {
        return Err(JsError::new_str("value is not a compiled script"));
    }
    // SAFETY: live context, event-loop thread (module docs).
    Ok(unsafe { compile::to_bytecode(realm.context, compiled) })
}

/// Load bytecode written by [`write_bytecode`].
///
/// Empty buffers, unreadable bytecode and bytecode holding anything other
/// than a compiled script are all errors.
pub(super) fn read_bytecode(
    realm: &QuickJsRealmAdapter,
    bytecode: &[u8],
) -> Result<QuickJsValueAdapter, JsError> {
    // `from_bytecode` asserts on an empty buffer.
    if bytecode.is_empty() {
        return Err(JsError::new_str("empty bytecode buffer"));
    }
    // SAFETY: live context, event-loop thread (module docs).
    let loaded = unsafe { compile::from_bytecode(realm.context, bytecode) }?;
    if loaded.is_compiled_function() {
        Ok(loaded)
    } else {
        Err(JsError::new_str("bytecode does not hold a compiled script"))
    }
}

/// Copy an engine string out using its reported length, embedded NULs
/// included.
pub(super) fn read_string(
    realm: &QuickJsRealmAdapter,
    value: &QuickJsValueAdapter,
) -> Result<String, JsError> {
    if !value.is_string() {
        return Err(JsError::new_str("value is not a string"));
    }
    let mut len: usize = 0;
    // SAFETY: live context, event-loop thread (module docs). `value` is a
    // string, so QuickJS returns a buffer of `len` bytes that we free below.
    unsafe {
        let ptr = q::JS_ToCStringLen2(realm.context, &mut len, *value.borrow_value(), 0);
        if ptr.is_null() {
            return Err(JsError::new_str("could not read engine string"));
        }
        let bytes = std::slice::from_raw_parts(ptr.cast::<u8>(), len);
        let text = String::from_utf8_lossy(bytes).into_owned();
        q::JS_FreeCString(realm.context, ptr);
        Ok(text)
    }
}
