use serde::Serialize;

/// Per-call result record handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseRecord {
    pub fn succeeded(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_face_detected(mut self, detected: bool) -> Self {
        self.face_detected = Some(detected);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Anything a bridge call can resolve with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BridgeValue {
    Record(ResponseRecord),
    /// Bare file path (process-image).
    Path(String),
    Flag(bool),
    /// Plain text (test-module).
    Message(String),
}

impl From<ResponseRecord> for BridgeValue {
    fn from(record: ResponseRecord) -> Self {
        BridgeValue::Record(record)
    }
}

impl From<bool> for BridgeValue {
    fn from(flag: bool) -> Self {
        BridgeValue::Flag(flag)
    }
}
