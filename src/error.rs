// Copyright 2022 Cognite AS
//! Errors for request construction and execution.
//!
//! `MalformedTemplate`, `InvalidUrl`, `Encode` and `InvalidQuery` are returned
//! synchronously while a request is being built. Everything else arrives
//! through the request's completion.

/// A request transport error, as reported by the [`crate::http::HttpClient`].
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "segment template {template:?} takes {placeholders} path variable(s), {supplied} supplied"
    )]
    MalformedTemplate {
        template: String,
        placeholders: usize,
        supplied: usize,
    },
    #[error("{url:?} is not a valid URL")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),
    #[error("query parameters must be a map of scalar values: {0}")]
    InvalidQuery(String),
    #[error("transport failure")]
    Transport(#[source] TransportError),
    #[error("server responded with status {status}")]
    NonSuccessStatus { status: u16, body: Vec<u8> },
    #[error("response did not match the expected type")]
    DecodeMismatch(#[source] serde_json::Error),
    #[error("request cancelled before completion")]
    Cancelled,
}

impl Error {
    /// The HTTP status, when the server answered with something other than 200.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NonSuccessStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for faults detected before anything was sent.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::MalformedTemplate { .. }
                | Error::InvalidUrl { .. }
                | Error::Encode(_)
                | Error::InvalidQuery(_)
        )
    }
}
