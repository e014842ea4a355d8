use axum::BoxError;
use axum::http::header::{InvalidHeaderName, InvalidHeaderValue};
use axum::http::method::InvalidMethod;
use axum::http::uri::InvalidUri;
use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, TriggerflareError>;

#[derive(Debug, Error)]
pub enum TriggerflareError {
    #[error("unsupported trigger type: {0}")]
    UnsupportedTrigger(String),
    #[error("application error: {0}")]
    App(BoxError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] InvalidHeaderName),
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),
    #[error("invalid method: {0}")]
    InvalidMethod(#[from] InvalidMethod),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] InvalidUri),
    #[error("request build error: {0}")]
    Http(#[from] axum::http::Error),
    #[error("body error: {0}")]
    Body(#[from] axum::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
