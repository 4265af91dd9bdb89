use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Caller-supplied input is missing or malformed.
    #[error("{0}")]
    Validation(String),
    /// The server is missing configuration an operator has to provide.
    #[error("{0}")]
    Configuration(String),
    /// The identity provider rejected the pushed authorization request.
    #[error("PAR request failed")]
    Upstream { status: StatusCode, details: String },
    #[error("Unexpected server error: {0}")]
    Internal(String),
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) | Self::Internal(_) | Self::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::Validation(message) => {
                tracing::debug!(error = %message, "Rejected invalid request");
                json!({ "error": message })
            }
            Self::Configuration(message) => {
                tracing::error!(error = %message, "Server configuration is incomplete");
                json!({ "error": message })
            }
            Self::Upstream {
                status: upstream,
                details,
            } => {
                tracing::warn!(%upstream, %details, "Upstream rejected the request");
                json!({ "error": self.to_string(), "details": details })
            }
            Self::Internal(_) | Self::Template(_) => {
                tracing::error!(error = %self, "Unexpected server error");
                json!({ "error": "Unexpected server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}
