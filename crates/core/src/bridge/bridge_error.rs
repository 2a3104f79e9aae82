use serde::Serialize;
use thiserror::Error;

/// Fixed rejection codes seen by the calling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "MODULE_ERROR")]
    Module,
    #[serde(rename = "DETECTION_ERROR")]
    Detection,
    #[serde(rename = "PROCESSING_ERROR")]
    Processing,
    #[serde(rename = "CROP_ERROR")]
    Crop,
    #[serde(rename = "SCAN_ERROR")]
    Scan,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Module => "MODULE_ERROR",
            ErrorCode::Detection => "DETECTION_ERROR",
            ErrorCode::Processing => "PROCESSING_ERROR",
            ErrorCode::Crop => "CROP_ERROR",
            ErrorCode::Scan => "SCAN_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected bridge call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{code}: {message}")]
pub struct BridgeError {
    pub code: ErrorCode,
    pub message: String,
}

impl BridgeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
