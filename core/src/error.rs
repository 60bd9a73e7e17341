//! Error types for the resource fetcher and query composer.
//!
//! # Design
//! `NotFound` gets a dedicated variant because an empty user lookup is a
//! normal outcome the caller wants to tell apart from a broken server. Every
//! other non-2xx response lands in `Status` with the raw status code and body
//! for debugging. Transport and decode failures keep the underlying message.

use thiserror::Error;

/// Fixed text shown to end users for any fetch failure.
pub const GENERIC_MESSAGE: &str = "Error occurred";

/// Errors returned by the fetcher, composer and pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The user lookup returned an empty list.
    #[error("no user named {username:?}")]
    NotFound { username: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be deserialized into the expected type.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl FetchError {
    /// Coarse message that hides the failure detail, for display surfaces
    /// that only need to say something went wrong.
    pub fn user_message(&self) -> &'static str {
        GENERIC_MESSAGE
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

/// Errors raised while building a [`crate::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("could not build HTTP client: {0}")]
    Client(String),
}
