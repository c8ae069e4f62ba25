use actix_web::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Terminal failure of one summarize/transcript request
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request or URL data: {0}")]
    InvalidRequest(String),

    #[error("Method Not Allowed. Use POST.")]
    MethodNotAllowed,

    #[error("Server configuration error: {0}")]
    ServerMisconfigured(String),

    #[error("{0}")]
    TranscriptUnavailable(String),

    #[error("Transcript file is empty.")]
    TranscriptEmpty,

    #[error("Transcript is too short to summarize ({length} characters).")]
    TranscriptTooShort { length: usize },

    #[error("{0}")]
    SummarizationFailed(String),
}

/// JSON error body: `{ "error": ..., "details"?: ... }`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "InvalidRequest",
            ApiError::MethodNotAllowed => "MethodNotAllowed",
            ApiError::ServerMisconfigured(_) => "ServerMisconfigured",
            ApiError::TranscriptUnavailable(_) => "TranscriptUnavailable",
            ApiError::TranscriptEmpty => "TranscriptEmpty",
            ApiError::TranscriptTooShort { .. } => "TranscriptTooShort",
            ApiError::SummarizationFailed(_) => "SummarizationFailed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::ServerMisconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::TranscriptUnavailable(_) | ApiError::TranscriptEmpty | ApiError::TranscriptTooShort { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::SummarizationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::TranscriptUnavailable(_) | ApiError::TranscriptEmpty | ApiError::TranscriptTooShort { .. } => {
                ErrorBody {
                    error: "Could not retrieve transcript.".to_string(),
                    details: Some(self.to_string()),
                }
            }
            ApiError::SummarizationFailed(_) => ErrorBody {
                error: "Summarization failed.".to_string(),
                details: Some(self.to_string()),
            },
            _ => ErrorBody {
                error: self.to_string(),
                details: None,
            },
        }
    }
}
