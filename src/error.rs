// src/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Server-side failures, mapped onto the wire contract of the chat endpoint:
/// quota errors keep their upstream status and user-facing message, anything
/// else collapses to a 500 with the error text in the body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Rate limits exceeded, please try again later.")]
    RateLimited,
    #[error("Payment required, please add funds to your workspace.")]
    PaymentRequired,
    #[error("AI gateway error")]
    Gateway,
    #[error("conversation not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
    #[error(transparent)]
    Upstream(#[from] reqwest::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Gateway
            | ApiError::Internal(_)
            | ApiError::Db(_)
            | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Client-side failures talking to the chat endpoint. Quota errors carry the
/// backend's mapped messages so the UI can show them verbatim.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Rate limits exceeded, please try again later.")]
    RateLimited,
    #[error("Payment required, please add funds to your workspace.")]
    PaymentRequired,
    #[error("chat endpoint returned {status}: {message}")]
    Endpoint { status: u16, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
