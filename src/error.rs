use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::query::{FieldError, ValidationError};

/// Failure talking to the upstream property-data provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("PropertyData API timed out")]
    Timeout,

    #[error("PropertyData API error: {0}")]
    Status(u16),

    #[error("PropertyData API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("PropertyData API returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Decode(err)
        } else {
            ProviderError::Transport(err)
        }
    }
}

/// Everything the request pipeline can reject a request with
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Invalid request parameters")]
    Validation(#[from] ValidationError),

    #[error("Request timeout - PropertyData API is slow")]
    UpstreamTimeout,

    #[error("Failed to fetch property data")]
    Upstream(#[source] ProviderError),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Timeout => AppError::UpstreamTimeout,
            other => AppError::Upstream(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            message: match &self {
                AppError::Upstream(err) => Some(err.to_string()),
                _ => None,
            },
            details: match &self {
                AppError::Validation(err) => Some(err.0.as_slice()),
                _ => None,
            },
        };

        (self.status(), Json(body)).into_response()
    }
}
