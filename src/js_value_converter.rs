//! Conversion between host text and engine values
//!
//! Everything crossing the bridge is text: names as plain strings, arguments
//! and results as JSON. These helpers are the only place where host text
//! turns into engine values and back.

use crate::error::EngineResult;
use crate::traits::JsEngine;

/// Build an engine string from host text.
pub fn to_engine_string<E: JsEngine>(engine: &E, text: &str) -> EngineResult<E::Value> {
    engine.pointer_to_string(text)
}

/// Materialize an engine string as an owned host string.
pub fn from_engine_string<E: JsEngine>(engine: &E, value: &E::Value) -> EngineResult<String> {
    engine.string_to_pointer(value)
}

/// Parse an engine string holding JSON into a structured engine value.
pub fn parse_json<E: JsEngine>(engine: &E, stringified: &E::Value) -> EngineResult<E::Value> {
    engine.json_parse(stringified)
}

/// Serialize an engine value into an engine string holding JSON.
pub fn stringify_json<E: JsEngine>(engine: &E, value: &E::Value) -> EngineResult<E::Value> {
    engine.json_stringify(value)
}

/// Host JSON text to structured engine value.
pub fn text_to_json_value<E: JsEngine>(engine: &E, json_text: &str) -> EngineResult<E::Value> {
    let stringified = to_engine_string(engine, json_text)?;
    parse_json(engine, &stringified)
}

/// Engine value to host JSON text.
pub fn value_to_json_text<E: JsEngine>(engine: &E, value: &E::Value) -> EngineResult<String> {
    let stringified = stringify_json(engine, value)?;
    from_engine_string(engine, &stringified)
}
