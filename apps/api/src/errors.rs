use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::inference::GenerationError;
use crate::resume_examples::corpus::CorpusError;
use crate::translation::TranslationError;

/// Errors that prevent the service from accepting traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Resume corpus could not be loaded: {0}")]
    CorpusLoad(#[from] CorpusError),
}

/// Direction of a translation call within a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationStage {
    Inbound,
    Outbound,
}

impl TranslationStage {
    fn as_str(self) -> &'static str {
        match self {
            TranslationStage::Inbound => "translate_inbound",
            TranslationStage::Outbound => "translate_outbound",
        }
    }
}

/// Per-request error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Translation failed ({}): {message}", .stage.as_str())]
    Translation {
        stage: TranslationStage,
        message: String,
    },

    #[error("Generation job was not accepted: {0}")]
    GenerationSubmission(String),

    #[error("Generation status check failed: {0}")]
    GenerationPoll(String),

    #[error("Generation job failed: {0}")]
    GenerationJobFailed(String),

    #[error("Generation timed out: {0}")]
    GenerationTimeout(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn translation(stage: TranslationStage, err: TranslationError) -> Self {
        AppError::Translation {
            stage,
            message: err.to_string(),
        }
    }

    /// Pipeline stage the error belongs to, reported back to the caller.
    pub fn stage(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Translation { stage, .. } => stage.as_str(),
            AppError::GenerationSubmission(_)
            | AppError::GenerationPoll(_)
            | AppError::GenerationJobFailed(_)
            | AppError::GenerationTimeout(_) => "generate",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        let message = err.to_string();
        match err {
            GenerationError::Submission { .. } | GenerationError::MissingJobId(_) => {
                AppError::GenerationSubmission(message)
            }
            GenerationError::Poll { .. } => AppError::GenerationPoll(message),
            GenerationError::JobFailed { .. } | GenerationError::EmptyOutput(_) => {
                AppError::GenerationJobFailed(message)
            }
            GenerationError::Timeout { .. } | GenerationError::DeadlineExceeded { .. } => {
                AppError::GenerationTimeout(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let stage = self.stage();
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Translation { message, .. } => {
                tracing::error!("Translation error ({stage}): {message}");
                (StatusCode::BAD_GATEWAY, "TRANSLATION_ERROR", self.to_string())
            }
            AppError::GenerationSubmission(msg) => {
                tracing::error!("Generation submission error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_SUBMISSION_ERROR",
                    self.to_string(),
                )
            }
            AppError::GenerationPoll(msg) => {
                tracing::error!("Generation poll error: {msg}");
                (StatusCode::BAD_GATEWAY, "GENERATION_POLL_ERROR", self.to_string())
            }
            AppError::GenerationJobFailed(msg) => {
                tracing::error!("Generation job failed: {msg}");
                (StatusCode::BAD_GATEWAY, "GENERATION_JOB_FAILED", self.to_string())
            }
            AppError::GenerationTimeout(msg) => {
                tracing::error!("Generation timeout: {msg}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "GENERATION_TIMEOUT",
                    self.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "stage": stage,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
