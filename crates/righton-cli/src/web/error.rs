use std::fmt;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use righton_store::StoreError;

#[derive(Debug)]
pub enum WebError {
    NotFound,
    BadRequest(String),
    Store(StoreError),
    Template(askama::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::NotFound => write!(f, "not found"),
            WebError::BadRequest(msg) => write!(f, "bad request: {msg}"),
            WebError::Store(e) => write!(f, "store error: {e}"),
            WebError::Template(e) => write!(f, "template error: {e}"),
        }
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WebError::Store(e) => Some(e),
            WebError::Template(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for WebError {
    fn from(e: StoreError) -> Self {
        WebError::Store(e)
    }
}

impl From<askama::Error> for WebError {
    fn from(e: askama::Error) -> Self {
        WebError::Template(e)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::NotFound => (
                StatusCode::NOT_FOUND,
                Html("<h1>Not Found</h1><p>Nothing lives at this address.</p>"),
            )
                .into_response(),
            WebError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            other => {
                tracing::error!("request failed: {other}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

pub type WebResult<T = Response> = std::result::Result<T, WebError>;

/// A form field that must be present and non-blank.
pub fn required(value: Option<String>, field: &str) -> WebResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WebError::BadRequest(format!("missing field '{field}'"))),
    }
}
