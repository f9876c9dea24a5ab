use crate::session::RequestState;

pub const FAILED_MESSAGE: &str = "Failed to get prediction.";
pub const BUSY_MESSAGE: &str = "Server is busy, please try again later.";

/// Why a prediction request did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    #[error("request timed out before the server responded")]
    TimedOut,
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request aborted")]
    Aborted,
}

impl PredictionError {
    /// Classifies a failed fetch by its `DOMException` name. An abort is the
    /// result of our own cancellation, not a transport fault.
    pub fn from_transport(name: &str, message: &str) -> Self {
        if name == "AbortError" {
            PredictionError::Aborted
        } else {
            PredictionError::Network(format!("{}: {}", name, message))
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, PredictionError::Aborted)
    }

    /// Only a timeout is distinguished for the user; every other failure
    /// collapses into the generic message.
    pub fn user_message(&self) -> &'static str {
        match self {
            PredictionError::TimedOut => BUSY_MESSAGE,
            _ => FAILED_MESSAGE,
        }
    }

    pub fn request_state(&self) -> RequestState {
        match self {
            PredictionError::TimedOut => RequestState::TimedOut,
            _ => RequestState::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    #[error("no camera frame available")]
    NoFrame,
    #[error("failed to encode frame: {0}")]
    Encode(String),
}

impl CaptureError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::CameraUnavailable(_) => "Camera is not available.",
            CaptureError::NoFrame => "Camera frame not ready, please try again.",
            CaptureError::Encode(_) => "Failed to capture photo.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid timeout `{0}`: expected milliseconds")]
    InvalidTimeout(String),
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}
