use std::time::Duration;

use thiserror::Error;

/// Failure kinds surfaced by the OCR pipeline.
///
/// `Input`, `Decode` and `InvalidImage` are caused by what the caller sent;
/// everything else is a server-side fault.
#[derive(Debug, Error)]
pub enum QalamError {
    #[error("{0}")]
    Input(String),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("recognition engine timed out after {0:?}")]
    EngineTimeout(Duration),

    #[error("recognition failed: {0}")]
    Recognition(String),

    #[error("processing failed: {0}")]
    Processing(String),
}

impl QalamError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            QalamError::Input(_) | QalamError::Decode(_) | QalamError::InvalidImage(_)
        )
    }

    /// Stable label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            QalamError::Input(_) => "input_error",
            QalamError::Decode(_) => "decode_error",
            QalamError::InvalidImage(_) => "invalid_image",
            QalamError::EngineUnavailable(_) => "engine_unavailable",
            QalamError::EngineTimeout(_) => "engine_timeout",
            QalamError::Recognition(_) => "recognition_error",
            QalamError::Processing(_) => "processing_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, QalamError>;
