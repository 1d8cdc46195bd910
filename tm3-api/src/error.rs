//! Error types for the TM3 API client.

use thiserror::Error;

/// Failures surfaced by the public operation surface.
///
/// Remote-call failures are always returned as `Err`, never panicked.
/// Nothing in this layer retries; callers re-invoke.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The operation/endpoint pair is not present in the endpoint table.
    #[error("unknown {operation} endpoint: {endpoint}")]
    UnknownEndpoint {
        operation: &'static str,
        endpoint: String,
    },

    /// A write operation was invoked without a payload.
    #[error("no payload for {operation} request to {endpoint}")]
    EmptyPayload {
        operation: &'static str,
        endpoint: String,
    },

    /// The API answered with a non-200 status.
    ///
    /// Carries the server-supplied `message` field when the response body
    /// had one, a generic fallback otherwise.
    #[error("Ticketmatic API error ({status}): {message}")]
    Remote {
        status: reqwest::StatusCode,
        message: String,
    },

    /// The request went out but no response was received.
    #[error("no response received from the Ticketmatic API")]
    Network(#[source] reqwest::Error),

    /// The request could not be constructed or transmitted.
    #[error("transport error")]
    Transport(#[source] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("could not decode API response")]
    Decode(#[from] serde_json::Error),

    /// A local file could not be read (image upload).
    #[error("could not read local file")]
    Io(#[from] std::io::Error),

    /// Credentials or configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Classify a reqwest failure: connection-level problems mean the
    /// request never got an answer, builder/request problems mean it never
    /// left properly. Everything else (interrupted body reads) counts as a
    /// network failure too.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Network(err)
        } else if err.is_builder() || err.is_request() {
            Self::Transport(err)
        } else {
            Self::Network(err)
        }
    }
}
