use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::assessment::{ExportError, InvalidResponse, Termination, TerminationView};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Assessment(InvalidResponse),
    Terminated(Termination),
    Export(ExportError),
    Responses(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Assessment(err) => write!(f, "invalid response: {}", err),
            AppError::Terminated(termination) => write!(
                f,
                "assessment terminated before a report could be generated: {}",
                termination
            ),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Responses(err) => write!(f, "malformed response set: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Assessment(err) => Some(err),
            AppError::Terminated(_) => None,
            AppError::Export(err) => Some(err),
            AppError::Responses(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Assessment(InvalidResponse::MissingAnswer(_)) | AppError::Terminated(_) => {
                StatusCode::CONFLICT
            }
            AppError::Assessment(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Responses(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Terminated(termination) => json!({
                "error": self.to_string(),
                "termination": TerminationView::from(*termination),
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<InvalidResponse> for AppError {
    fn from(value: InvalidResponse) -> Self {
        Self::Assessment(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Responses(value)
    }
}
