//! Result record returned by data-producing bridge operations

use crate::error::{EngineResult, StatusCode};
use serde::Serialize;

/// Status code plus optional text.
///
/// `text` is present if and only if `status_code` is [`StatusCode::Success`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResult {
    status_code: StatusCode,
    text: Option<String>,
}

impl BridgeResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::Success,
            text: Some(text.into()),
        }
    }

    /// Failed result. A `Success` code here would break the invariant, so it
    /// is recorded as `InvalidArgument` instead.
    pub fn failure(status_code: StatusCode) -> Self {
        let status_code = if status_code.is_success() {
            StatusCode::InvalidArgument
        } else {
            status_code
        };
        Self {
            status_code,
            text: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status_code.is_success()
    }

    pub fn into_result(self) -> std::result::Result<String, StatusCode> {
        match self.text {
            Some(text) if self.status_code.is_success() => Ok(text),
            _ => Err(self.status_code),
        }
    }
}

impl From<EngineResult<String>> for BridgeResult {
    fn from(result: EngineResult<String>) -> Self {
        match result {
            Ok(text) => BridgeResult::success(text),
            Err(err) => BridgeResult::failure(err.code),
        }
    }
}
