//! Status codes and error types for the bridge
//!
//! The executor surface only speaks in engine status codes. The typed layers
//! (`JsonExecutor`, `Runtime`, the CLI) lift those codes into `BridgeError`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Engine status code reported by the engine collaborator.
///
/// Values are stable and grouped by category: `0x1xxxx` usage errors,
/// `0x2xxxx` engine errors, `0x3xxxx` script errors, `0x4xxxx` fatal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StatusCode {
    Success = 0,
    /// A host value could not be converted to or from an engine value.
    InvalidArgument = 0x10001,
    NullArgument = 0x10002,
    /// A property lookup was attempted on something that is not an object.
    ArgumentNotObject = 0x10006,
    /// A call was attempted on something that is not a function.
    ArgumentNotFunction = 0x10007,
    BadSerializedScript = 0x10008,
    OutOfMemory = 0x20001,
    /// JavaScript threw while running a script or function.
    ScriptException = 0x30001,
    ScriptCompile = 0x30002,
    ScriptTerminated = 0x30003,
    /// The text handed to the engine JSON parser is not valid JSON.
    JsonParse = 0x30004,
    Fatal = 0x40001,
}

/// Coarse classification of a [`StatusCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Success,
    Conversion,
    JsonParse,
    Lookup,
    Invocation,
    Engine,
}

impl StatusCode {
    const ALL: [StatusCode; 12] = [
        StatusCode::Success,
        StatusCode::InvalidArgument,
        StatusCode::NullArgument,
        StatusCode::ArgumentNotObject,
        StatusCode::ArgumentNotFunction,
        StatusCode::BadSerializedScript,
        StatusCode::OutOfMemory,
        StatusCode::ScriptException,
        StatusCode::ScriptCompile,
        StatusCode::ScriptTerminated,
        StatusCode::JsonParse,
        StatusCode::Fatal,
    ];

    /// Numeric value of the code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look up a status code by its numeric value.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }

    pub fn category(self) -> ErrorCategory {
        match self {
            StatusCode::Success => ErrorCategory::Success,
            StatusCode::InvalidArgument | StatusCode::NullArgument => ErrorCategory::Conversion,
            StatusCode::JsonParse => ErrorCategory::JsonParse,
            StatusCode::ArgumentNotObject | StatusCode::ArgumentNotFunction => {
                ErrorCategory::Lookup
            }
            StatusCode::ScriptException
            | StatusCode::ScriptCompile
            | StatusCode::ScriptTerminated => ErrorCategory::Invocation,
            StatusCode::BadSerializedScript | StatusCode::OutOfMemory | StatusCode::Fatal => {
                ErrorCategory::Engine
            }
        }
    }

    /// `Ok(())` for [`StatusCode::Success`], the code itself otherwise.
    pub fn into_result(self) -> std::result::Result<(), StatusCode> {
        if self.is_success() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} (0x{:05x})", self, self.code())
    }
}

/// Failure reported by the engine collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct EngineError {
    pub code: StatusCode,
    pub message: String,
}

impl EngineError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Error type for the typed executor layers and the CLI.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{operation} failed with engine status {code}")]
    Engine {
        operation: &'static str,
        code: StatusCode,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Status code carried by an engine failure, if any.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            BridgeError::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
