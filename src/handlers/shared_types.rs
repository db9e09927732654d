use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors a handler can hand back to the client.
///
/// Registry failures never show up here: they are absorbed by the metrics
/// backend before they can reach a handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body parsed but failed a business rule.
    #[error("{0}")]
    Validation(String),

    /// Body could not be read as the expected JSON document.
    #[error(transparent)]
    MalformedBody(#[from] JsonRejection),

    /// Intentional failure produced by `/simulate/error`.
    #[error("Simulated {0}")]
    SimulatedFailure(&'static str),
}

/// JSON error body shared by every failing endpoint.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MalformedBody(rejection) => rejection.status(),
            ApiError::SimulatedFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => "validation_error",
            ApiError::SimulatedFailure(_) => "simulated_failure",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
