//! Error taxonomy for resource requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::TransportError;

/// Structured error payload returned by a server on a non-2xx response.
///
/// Unknown fields are ignored, so `{"error":"x"}` decodes with `message: None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: Option<String>,
}

/// Every way [`ResourceClient::execute`](crate::ResourceClient::execute) can fail.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The request could not be constructed (URL or header rejected).
    /// Nothing was sent.
    #[error("bad request: unable to perform the request")]
    BadRequest,

    /// A 2xx body did not match the expected type.
    #[error("unable to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The transport produced something without a usable HTTP status.
    #[error("invalid response")]
    InvalidResponse,

    /// The server answered non-2xx with a structured [`ErrorEnvelope`].
    #[error("server error: {}", .0.message.as_deref().unwrap_or("no message"))]
    Server(ErrorEnvelope),

    /// The server answered non-2xx and the body was not an [`ErrorEnvelope`].
    #[error("HTTP {status} with unreadable error body: {source}")]
    MalformedErrorBody {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// Connection, TLS, timeout or other transport failure, passed through as-is.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),
}

impl NetworkError {
    /// Stable snake_case label for logs and call records.
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkError::BadRequest => "bad_request",
            NetworkError::Decode(_) => "decode_failure",
            NetworkError::InvalidResponse => "invalid_response",
            NetworkError::Server(_) => "server_error",
            NetworkError::MalformedErrorBody { .. } => "malformed_error_body",
            NetworkError::Transport(_) => "transport",
        }
    }
}
