use reqwest::StatusCode;

use crate::mercator::{InvalidTileSize, InvalidZoom};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("'{url}' responded with {status}")]
    Status { status: StatusCode, url: String },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Service returned status {status}: {message}")]
    Service { status: i64, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Zoom(#[from] InvalidZoom),

    #[error(transparent)]
    TileSize(#[from] InvalidTileSize),
}

impl Error {
    pub(crate) fn invalid_response(what: impl Into<String>) -> Self {
        Self::InvalidResponse(what.into())
    }

    pub(crate) fn invalid_argument(what: impl Into<String>) -> Self {
        Self::InvalidArgument(what.into())
    }
}
