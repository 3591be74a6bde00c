use serde::{Deserialize, Serialize};

use crate::codes::ResCode;
use crate::error::DecodeError;

/// Outcome of one decode call: a status code and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Status code from the fixed table.
    pub code: ResCode,
    /// Description of the code, or the error detail for failures.
    pub message: String,
}

impl Response {
    #[must_use]
    pub fn new(code: ResCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `200` / `OK`.
    #[must_use]
    pub fn ok() -> Self {
        Self::from_code(ResCode::Success)
    }

    /// Response carrying the table description of `code`.
    #[must_use]
    pub fn from_code(code: ResCode) -> Self {
        Self::new(code, code.description())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

impl From<&DecodeError> for Response {
    fn from(err: &DecodeError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

impl From<DecodeError> for Response {
    fn from(err: DecodeError) -> Self {
        Self::from(&err)
    }
}

impl<T> From<Result<T, DecodeError>> for Response {
    fn from(result: Result<T, DecodeError>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(err) => Self::from(&err),
        }
    }
}
