//! Error types and their HTTP mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;

use crate::fetch::FetchError;

/// Errors surfaced by the playlist and chunklist routes.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The requested channel id is not in the directory.
    #[error("unknown channel: {0}")]
    ChannelNotFound(String),

    /// A radio channel record is missing its stream name.
    #[error("channel {0} has no stream name configured")]
    InvalidChannelConfig(String),

    /// The chunklist query value does not name a chunklist.
    #[error("invalid chunklist name: {0}")]
    InvalidChunklist(String),

    /// The upstream fetch failed.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[from] FetchError),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::ChannelNotFound(_) | ProxyError::InvalidChunklist(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::InvalidChannelConfig(_) | ProxyError::UpstreamFetch(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Wire shape kept compatible with Boom-style clients.
#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "isBoom")]
    is_boom: bool,
    message: String,
    output: ErrorOutput,
}

#[derive(Serialize)]
struct ErrorOutput {
    #[serde(rename = "statusCode")]
    status_code: u16,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorBody {
            is_boom: true,
            message: self.to_string(),
            output: ErrorOutput {
                status_code: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}
