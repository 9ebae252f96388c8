//! Error taxonomy for the board domain.
//!
//! [`ApiFailure`] is the outcome of a single request; every [`crate::ApiClient`]
//! implementation reports failures through it and never panics.
//!
//! [`BoardError`] covers conditions that abort a whole board build. Only a
//! failure of the root pipelines collection produces one: failures below the
//! root are captured as [`crate::Branch::Failed`] and never propagate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Request-level failures
// ---------------------------------------------------------------------------

/// Why a single API request did not yield a usable JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum ApiFailure {
    /// The server answered with a non-success status. The body is not inspected.
    #[error("HTTP error: status {status}")]
    HttpError {
        /// The response status code.
        status: u16,
    },

    /// The request never produced a response (connection refused, DNS, TLS, ...).
    #[error("Transport error: {message}")]
    TransportError {
        /// Description from the transport layer.
        message: String,
    },

    /// The server answered with a success status but the body was not the
    /// expected JSON shape.
    #[error("Decode error: {message}")]
    DecodeError {
        /// Description from the JSON decoder.
        message: String,
    },
}

impl ApiFailure {
    /// Short machine-readable reason tag (`"http-error"`, `"transport-error"`,
    /// `"decode-error"`).
    pub fn reason(&self) -> &'static str {
        match self {
            ApiFailure::HttpError { .. } => "http-error",
            ApiFailure::TransportError { .. } => "transport-error",
            ApiFailure::DecodeError { .. } => "decode-error",
        }
    }

    /// The HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiFailure::HttpError { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiFailure {
    fn from(err: serde_json::Error) -> Self {
        ApiFailure::DecodeError {
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Board-level failures
// ---------------------------------------------------------------------------

/// Errors that abort a board build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The pipelines collection could not be fetched or decoded.
    ///
    /// The caller renders a failure indication instead of a board.
    #[error("Failed to load pipelines: {source}")]
    RootFailure {
        /// The failure of the root request.
        #[source]
        source: ApiFailure,
    },
}
