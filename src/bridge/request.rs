//! Bridge requests

use serde::{Deserialize, Serialize};

use super::response::BridgeError;

/// One call from the host. Serialized as `{"method": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Request {
    StartRecording {
        /// CACHE, LIBRARY or DOCUMENTS; absent uses the configured default
        #[serde(default, skip_serializing_if = "Option::is_none")]
        directory: Option<String>,
        #[serde(
            default,
            rename = "subDirectory",
            skip_serializing_if = "Option::is_none"
        )]
        sub_directory: Option<String>,
        /// Wording of the in-progress notification
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    StopRecording,
    PauseRecording,
    ResumeRecording,
    GetCurrentStatus,
    GetOutputFile,
    CanDeviceVoiceRecord,
    HasAudioRecordingPermission,
    RequestAudioRecordingPermission,

    // notifications forwarded by the host
    InterruptionBegan,
    InterruptionEnded {
        #[serde(default, rename = "shouldResume")]
        should_resume: bool,
    },
    RouteChanged {
        reason: String,
    },
    EnteredBackground,
    EnteredForeground,
}

impl Request {
    /// Parse one protocol line
    pub fn parse(line: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(line.trim()).map_err(|e| BridgeError::invalid_request(e.to_string()))
    }

    /// Serialize as one protocol line (no trailing newline)
    pub fn to_line(&self) -> String {
        // only strings and bools, serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// The method name on the wire
    pub fn method(&self) -> &'static str {
        match self {
            Self::StartRecording { .. } => "startRecording",
            Self::StopRecording => "stopRecording",
            Self::PauseRecording => "pauseRecording",
            Self::ResumeRecording => "resumeRecording",
            Self::GetCurrentStatus => "getCurrentStatus",
            Self::GetOutputFile => "getOutputFile",
            Self::CanDeviceVoiceRecord => "canDeviceVoiceRecord",
            Self::HasAudioRecordingPermission => "hasAudioRecordingPermission",
            Self::RequestAudioRecordingPermission => "requestAudioRecordingPermission",
            Self::InterruptionBegan => "interruptionBegan",
            Self::InterruptionEnded { .. } => "interruptionEnded",
            Self::RouteChanged { .. } => "routeChanged",
            Self::EnteredBackground => "enteredBackground",
            Self::EnteredForeground => "enteredForeground",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_with_options() {
        let request = Request::parse(
            r#"{"method":"startRecording","directory":"CACHE","subDirectory":"a/b","title":"Memo"}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::StartRecording {
                directory: Some("CACHE".into()),
                sub_directory: Some("a/b".into()),
                title: Some("Memo".into()),
                message: None,
            }
        );
    }

    #[test]
    fn start_options_are_optional() {
        let request = Request::parse(r#"{"method":"startRecording"}"#).unwrap();
        assert_eq!(
            request,
            Request::StartRecording {
                directory: None,
                sub_directory: None,
                title: None,
                message: None,
            }
        );
    }

    #[test]
    fn permission_methods_use_plugin_names() {
        assert_eq!(
            Request::parse(r#"{"method":"requestAudioRecordingPermission"}"#).unwrap(),
            Request::RequestAudioRecordingPermission
        );
        assert_eq!(
            Request::CanDeviceVoiceRecord.to_line(),
            r#"{"method":"canDeviceVoiceRecord"}"#
        );
    }

    #[test]
    fn unit_methods_ignore_extra_fields() {
        let request = Request::parse(r#"{"method":"stopRecording","extra":1}"#).unwrap();
        assert_eq!(request, Request::StopRecording);
    }

    #[test]
    fn interruption_end_defaults_to_no_resume() {
        let request = Request::parse(r#"{"method":"interruptionEnded"}"#).unwrap();
        assert_eq!(request, Request::InterruptionEnded { should_resume: false });
    }

    #[test]
    fn unknown_method_is_invalid() {
        let err = Request::parse(r#"{"method":"rewind"}"#).unwrap_err();
        assert_eq!(err.code.as_str(), "INVALID_REQUEST");
        assert!(Request::parse("not json").is_err());
    }

    #[test]
    fn line_uses_wire_names() {
        let line = Request::InterruptionEnded {
            should_resume: true,
        }
        .to_line();
        assert_eq!(line, r#"{"method":"interruptionEnded","shouldResume":true}"#);
        assert_eq!(Request::parse(&line).unwrap().method(), "interruptionEnded");
    }
}
