//! Bridge executor tests against the real QuickJS engine

#[path = "../support/mod.rs"]
mod support;

use batched_bridge::js_value_converter::{from_engine_string, to_engine_string};
use batched_bridge::{BridgeExecutor, EngineConfig, EngineHost, QuickJsHost, StatusCode};
use serde_json::{Value, json};
use support::{ECHO_BRIDGE, EMPTY_QUEUE_BRIDGE};

fn quickjs() -> BridgeExecutor<QuickJsHost> {
    BridgeExecutor::initialize_host(EngineConfig::default()).expect("QuickJS should start")
}

fn with_echo_bridge() -> BridgeExecutor<QuickJsHost> {
    let executor = quickjs();
    assert_eq!(executor.run_script(ECHO_BRIDGE, "echo.js"), StatusCode::Success);
    executor
}

fn parse(text: Option<&str>) -> Value {
    serde_json::from_str(text.expect("result should carry text")).unwrap()
}

fn global_type(executor: &BridgeExecutor<QuickJsHost>, name: &str) -> Value {
    let script = format!("globalThis.__typeOf = typeof globalThis.{};", name);
    assert_eq!(executor.run_script(&script, "typeof.js"), StatusCode::Success);
    parse(executor.get_global_variable("__typeOf").text())
}

#[test]
fn test_load_bridge_flush_and_dispose() {
    let executor = quickjs();

    assert_eq!(
        executor.run_script(EMPTY_QUEUE_BRIDGE, "test.js"),
        StatusCode::Success
    );

    let result = executor.flushed_queue();
    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(result.text(), Some("[]"));

    assert_eq!(executor.dispose_host(), StatusCode::Success);
}

#[test]
fn test_call_function_receives_global_then_module_method_args() {
    let executor = with_echo_bridge();

    let result = executor.call_function_and_return_flushed_queue("Mod", "method", "[1,2]");

    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(
        parse(result.text()),
        json!({
            "receiverIsGlobal": true,
            "argc": 3,
            "module": "Mod",
            "method": "method",
            "args": [1, 2]
        })
    );
}

#[test]
fn test_invoke_callback_receives_global_then_id_args() {
    let executor = with_echo_bridge();

    let result = executor.invoke_callback_and_return_flushed_queue(7, "[]");

    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(
        parse(result.text()),
        json!({"receiverIsGlobal": true, "argc": 2, "callbackId": 7, "args": []})
    );
}

#[test]
fn test_flushed_queue_receives_only_global() {
    let executor = with_echo_bridge();

    let result = executor.flushed_queue();

    assert_eq!(
        parse(result.text()),
        json!({"receiverIsGlobal": true, "argc": 0})
    );
}

#[test]
fn test_missing_bridge_is_argument_not_object() {
    let executor = quickjs();

    let result = executor.flushed_queue();
    assert_eq!(result.status_code(), StatusCode::ArgumentNotObject);
    assert_eq!(result.text(), None);

    let result = executor.call_function_and_return_flushed_queue("Mod", "method", "[]");
    assert_eq!(result.status_code(), StatusCode::ArgumentNotObject);
}

#[test]
fn test_missing_member_is_argument_not_function() {
    let executor = quickjs();
    assert_eq!(
        executor.run_script(EMPTY_QUEUE_BRIDGE, "test.js"),
        StatusCode::Success
    );

    let result = executor.invoke_callback_and_return_flushed_queue(1, "[]");
    assert_eq!(result.status_code(), StatusCode::ArgumentNotFunction);
    assert_eq!(result.text(), None);
}

#[test]
fn test_throwing_member_is_script_exception() {
    let executor = quickjs();
    let bridge = "var __fbBatchedBridge = {flushedQueue: function () { throw new Error('boom'); }};";
    assert_eq!(executor.run_script(bridge, "throw.js"), StatusCode::Success);

    let result = executor.flushed_queue();
    assert_eq!(result.status_code(), StatusCode::ScriptException);
    assert_eq!(result.text(), None);
}

#[test]
fn test_invalid_args_json_never_reaches_javascript() {
    let executor = with_echo_bridge();

    let result = executor.call_function_and_return_flushed_queue("Mod", "method", "[1,");
    assert_eq!(result.status_code(), StatusCode::JsonParse);
    assert_eq!(result.text(), None);

    assert_eq!(global_type(&executor, "__called"), json!("boolean"));
    assert_eq!(
        parse(executor.get_global_variable("__called").text()),
        json!(false)
    );
}

#[test]
fn test_set_then_get_global_round_trips() {
    let executor = quickjs();
    let config = json!({
        "remoteModuleConfig": [["Timing", null, ["createTimer", "deleteTimer"]]],
        "nested": {"flag": true, "ratio": 0.5}
    });

    assert_eq!(
        executor.set_global_variable("__fbBatchedBridgeConfig", &config.to_string()),
        StatusCode::Success
    );

    let result = executor.get_global_variable("__fbBatchedBridgeConfig");
    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(parse(result.text()), config);
}

#[test]
fn test_invalid_global_json_binds_nothing() {
    let executor = quickjs();

    let status = executor.set_global_variable("brokenConfig", "{not json");
    assert_eq!(status, StatusCode::JsonParse);

    assert_eq!(global_type(&executor, "brokenConfig"), json!("undefined"));
}

#[test]
fn test_get_undefined_global_fails_without_text() {
    let executor = quickjs();

    let result = executor.get_global_variable("neverDefined");
    assert_eq!(result.status_code(), StatusCode::InvalidArgument);
    assert_eq!(result.text(), None);
}

#[test]
fn test_syntax_error_fails_run_script() {
    let executor = quickjs();

    let status = executor.run_script("var = ;", "broken.js");
    assert_eq!(status, StatusCode::ScriptCompile);
}

#[test]
fn test_thrown_syntax_error_is_script_exception() {
    let executor = quickjs();

    let status = executor.run_script("throw new SyntaxError('late');", "late.js");
    assert_eq!(status, StatusCode::ScriptException);

    let status = executor.run_script("JSON.parse('{');", "late.js");
    assert_eq!(status, StatusCode::ScriptException);
}

#[test]
fn test_error_message_text_does_not_pick_the_status() {
    let executor = quickjs();
    let bridge = r#"var __fbBatchedBridge = {
        flushedQueue: function () { throw new Error('out of memory'); },
        invokeCallbackAndReturnFlushedQueue: function () { throw new Error('interrupted'); }
    };"#;
    assert_eq!(executor.run_script(bridge, "messages.js"), StatusCode::Success);

    assert_eq!(
        executor.flushed_queue().status_code(),
        StatusCode::ScriptException
    );
    assert_eq!(
        executor
            .invoke_callback_and_return_flushed_queue(1, "[]")
            .status_code(),
        StatusCode::ScriptException
    );
}

#[test]
fn test_member_returning_undefined_is_invalid_argument() {
    let executor = quickjs();
    let bridge = "var __fbBatchedBridge = {flushedQueue: function () {}};";
    assert_eq!(executor.run_script(bridge, "silent.js"), StatusCode::Success);

    let result = executor.flushed_queue();
    assert_eq!(result.status_code(), StatusCode::InvalidArgument);
    assert_eq!(result.text(), None);
}

#[test]
fn test_function_valued_global_has_no_json_text() {
    let executor = quickjs();
    assert_eq!(
        executor.run_script("globalThis.handler = function () {};", "fn.js"),
        StatusCode::Success
    );

    let result = executor.get_global_variable("handler");
    assert_eq!(result.status_code(), StatusCode::InvalidArgument);
    assert_eq!(result.text(), None);
}

#[test]
fn test_engine_strings_keep_embedded_nul() {
    let host = QuickJsHost::init(EngineConfig::default()).expect("QuickJS should start");

    let text = host
        .execute(|realm| {
            let value = to_engine_string(realm, "a\0b")?;
            from_engine_string(realm, &value)
        })
        .unwrap();
    assert_eq!(text, "a\0b");
    assert_eq!(text.len(), 3);

    host.destroy().unwrap();
}

#[test]
fn test_json_text_with_embedded_nul_is_not_truncated() {
    let executor = quickjs();

    // Cut at the NUL this would read as `1`.
    let status = executor.set_global_variable("x", "1\0x");
    assert_eq!(status, StatusCode::JsonParse);
    assert_eq!(global_type(&executor, "x"), json!("undefined"));

    assert_eq!(
        executor.set_global_variable("y", "\"a\\u0000b\""),
        StatusCode::Success
    );
    assert_eq!(
        executor.get_global_variable("y").text(),
        Some("\"a\\u0000b\"")
    );
}

#[test]
fn test_run_script_discards_completion_value() {
    let executor = quickjs();

    assert_eq!(executor.run_script("40 + 2", "value.js"), StatusCode::Success);
    assert_eq!(
        executor.run_script("globalThis.answer = 42;", "value.js"),
        StatusCode::Success
    );
    assert_eq!(
        parse(executor.get_global_variable("answer").text()),
        json!(42)
    );
}

#[test]
fn test_serialized_script_runs_like_source() {
    let compiler = quickjs();
    let mut serialized = Vec::new();
    assert_eq!(
        compiler.serialize_script(EMPTY_QUEUE_BRIDGE, "bundle.js", &mut serialized),
        StatusCode::Success
    );
    assert!(!serialized.is_empty());

    let executor = quickjs();
    assert_eq!(
        executor.run_serialized_script(EMPTY_QUEUE_BRIDGE, &serialized, "bundle.js"),
        StatusCode::Success
    );
    assert_eq!(executor.flushed_queue().text(), Some("[]"));
}

#[test]
fn test_serialize_syntax_error_leaves_buffer_empty() {
    let executor = quickjs();
    let mut serialized = Vec::new();

    let status = executor.serialize_script("function (", "broken.js", &mut serialized);
    assert_eq!(status, StatusCode::ScriptCompile);
    assert!(serialized.is_empty());
}

#[test]
fn test_serialized_script_keeps_its_source_url() {
    let compiler = quickjs();
    let source = "globalThis.origin = new Error('where').stack;";
    let mut serialized = Vec::new();
    assert_eq!(
        compiler.serialize_script(source, "app/index.bundle.js", &mut serialized),
        StatusCode::Success
    );

    let executor = quickjs();
    assert_eq!(
        executor.run_serialized_script(source, &serialized, "app/index.bundle.js"),
        StatusCode::Success
    );
    let stack = parse(executor.get_global_variable("origin").text());
    let stack = stack.as_str().expect("stack should be a string");
    assert!(stack.contains("app/index.bundle.js"), "stack: {}", stack);
}

#[test]
fn test_unreadable_serialized_buffer_falls_back_to_source() {
    let executor = quickjs();

    assert_eq!(
        executor.run_serialized_script(EMPTY_QUEUE_BRIDGE, b"not bytecode", "bundle.js"),
        StatusCode::Success
    );
    assert_eq!(executor.flushed_queue().text(), Some("[]"));
}

#[test]
fn test_serialized_non_script_value_falls_back_to_source() {
    let executor = quickjs();
    // Current bytecode version, no atoms, then a bare `null`.
    let serialized_null = [4u8, 0, 1];

    assert_eq!(
        executor.run_serialized_script(EMPTY_QUEUE_BRIDGE, &serialized_null, "bundle.js"),
        StatusCode::Success
    );
    assert_eq!(executor.flushed_queue().text(), Some("[]"));
}

#[test]
fn test_empty_serialized_buffer_falls_back_to_source() {
    let executor = quickjs();

    assert_eq!(
        executor.run_serialized_script(EMPTY_QUEUE_BRIDGE, &[], "bundle.js"),
        StatusCode::Success
    );
    assert_eq!(executor.flushed_queue().text(), Some("[]"));
}

#[test]
fn test_dispose_then_initialize_again() {
    let first = quickjs();
    assert_eq!(
        first.set_global_variable("leftover", "1"),
        StatusCode::Success
    );
    assert_eq!(first.dispose_host(), StatusCode::Success);

    let second = quickjs();
    assert!(!second.get_global_variable("leftover").is_success());
    assert_eq!(second.dispose_host(), StatusCode::Success);
}

#[test]
fn test_memory_limited_engine_still_runs_bridge() {
    let config = EngineConfig::new()
        .with_memory_limit(Some(32 * 1024 * 1024))
        .with_max_stack_size(Some(512 * 1024));
    let executor =
        BridgeExecutor::<QuickJsHost>::initialize_host(config).expect("QuickJS should start");

    assert_eq!(
        executor.run_script(EMPTY_QUEUE_BRIDGE, "test.js"),
        StatusCode::Success
    );
    assert_eq!(executor.flushed_queue().text(), Some("[]"));
    assert_eq!(executor.dispose_host(), StatusCode::Success);
}
