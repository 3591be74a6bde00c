use crate::capture::CaptureError;
use crate::codes::ResCode;
use crate::missing::MissingFields;

/// Why decoding an argument string failed.
///
/// `Display` renders exactly the message carried by the matching
/// [`Response`](crate::Response); [`code`](DecodeError::code) gives its code.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input is not a JSON object.
    #[error("Convert Json fail! : {0}")]
    Syntax(#[source] serde_json::Error),
    /// The object does not fit the destination type.
    #[error("{0}")]
    Convert(#[source] serde_json::Error),
    /// The object carries keys the destination does not consume.
    #[error("invalid keys: {}", .0.join(", "))]
    UnusedKeys(Vec<String>),
    /// The decoded value could not be captured for validation.
    #[error("{0}")]
    Capture(#[from] CaptureError),
    /// Decoding succeeded but some fields were left empty.
    #[error("Missing field in JSON: {0}")]
    MissingFields(MissingFields),
}

impl DecodeError {
    #[must_use]
    pub fn code(&self) -> ResCode {
        match self {
            DecodeError::Syntax(_) => ResCode::ConvertJsonFail,
            DecodeError::Convert(_) | DecodeError::UnusedKeys(_) | DecodeError::Capture(_) => {
                ResCode::ConvertDataFail
            }
            DecodeError::MissingFields(_) => ResCode::NoDataValid,
        }
    }

    /// Missing fragments when this is a missing-field error.
    #[must_use]
    pub fn missing_fields(&self) -> Option<&MissingFields> {
        match self {
            DecodeError::MissingFields(missing) => Some(missing),
            _ => None,
        }
    }
}
