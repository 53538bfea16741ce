//! Bridge responses and error codes

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::recording::RecordingStatus;

/// Error codes reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    CannotRecordOnThisPhone,
    MissingPermission,
    MicrophoneBeingUsed,
    AlreadyRecording,
    FailedToRecord,
    RecordingHasNotStarted,
    FailedToFetchRecording,
    EmptyRecording,
    InvalidRequest,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CannotRecordOnThisPhone => "CANNOT_RECORD_ON_THIS_PHONE",
            Self::MissingPermission => "MISSING_PERMISSION",
            Self::MicrophoneBeingUsed => "MICROPHONE_BEING_USED",
            Self::AlreadyRecording => "ALREADY_RECORDING",
            Self::FailedToRecord => "FAILED_TO_RECORD",
            Self::RecordingHasNotStarted => "RECORDING_HAS_NOT_STARTED",
            Self::FailedToFetchRecording => "FAILED_TO_FETCH_RECORDING",
            Self::EmptyRecording => "EMPTY_RECORDING",
            Self::InvalidRequest => "INVALID_REQUEST",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failed request: a code plus the chain of underlying causes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}")]
pub struct BridgeError {
    pub code: ErrorCode,
    pub causes: Vec<String>,
}

impl BridgeError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            causes: Vec::new(),
        }
    }

    /// Code with the display of `error` and each of its sources as causes
    pub fn caused_by(code: ErrorCode, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = vec![error.to_string()];
        let mut source = error.source();
        while let Some(inner) = source {
            causes.push(inner.to_string());
            source = inner.source();
        }
        Self { code, causes }
    }

    pub fn with_cause(code: ErrorCode, cause: impl Into<String>) -> Self {
        Self {
            code,
            causes: vec![cause.into()],
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::with_cause(ErrorCode::InvalidRequest, reason)
    }
}

/// Error payload on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub causes: Vec<String>,
}

/// A finished recording as reported to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordData {
    pub ms_duration: u64,
    pub mime_type: String,
    /// Relative to the base directory
    pub path: String,
    /// `file://` URI of the absolute path
    pub uri: String,
}

impl RecordData {
    pub fn new(ms_duration: u64, mime_type: &str, relative: &str, absolute: &Path) -> Self {
        Self {
            ms_duration,
            mime_type: mime_type.to_string(),
            path: relative.to_string(),
            uri: format!("file://{}", absolute.display()),
        }
    }
}

/// Payload of a `value` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Flag(bool),
    Recording(RecordData),
    /// Output file path, `null` before the first recording
    Path(Option<String>),
}

/// One response line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Error { error: ErrorBody },
    Status { status: RecordingStatus },
    Value { value: Value },
}

impl Response {
    pub fn flag(value: bool) -> Self {
        Self::Value {
            value: Value::Flag(value),
        }
    }

    pub fn status(status: RecordingStatus) -> Self {
        Self::Status { status }
    }

    pub fn recording(data: RecordData) -> Self {
        Self::Value {
            value: Value::Recording(data),
        }
    }

    pub fn path(path: Option<String>) -> Self {
        Self::Value {
            value: Value::Path(path),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Parse one protocol line
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }

    /// Serialize as one protocol line (no trailing newline)
    pub fn to_line(&self) -> String {
        // plain strings, numbers and bools; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<BridgeError> for Response {
    fn from(e: BridgeError) -> Self {
        Self::Error {
            error: ErrorBody {
                message: e.code.as_str().to_string(),
                causes: e.causes,
            },
        }
    }
}

impl<T: Into<Response>> From<Result<T, BridgeError>> for Response {
    fn from(result: Result<T, BridgeError>) -> Self {
        match result {
            Ok(response) => response.into(),
            Err(e) => e.into(),
        }
    }
}
