//! Error types for the launch API client.
//!
//! # Design
//! Three disjoint families keep "you asked for something invalid" apart from
//! "the service failed":
//! - `ConfigError`: construction-time problems (API key, environment,
//!   watcher interval).
//! - `ValidationError`: the caller's query options were rejected before any
//!   network I/O happened.
//! - `ApiError`: the request was sent and the transport or the service
//!   failed. `NotFound` gets a dedicated variant because callers frequently
//!   distinguish "no such resource" from "unexpected status".
//!
//! `Error` wraps all three for the convenience API.

use crate::params::FieldError;
use crate::resource::Resource;

/// Errors raised while building a client or a watcher.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("no API key was provided (set LAUNCH_API_KEY)")]
    MissingApiKey,

    #[error("invalid API key: keys must be UUID v4 strings")]
    InvalidApiKey,

    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidEnv { var: &'static str, value: String },

    /// Watcher intervals of zero or below are never usable.
    #[error("invalid watcher interval {minutes}: the interval must be greater than 0 minutes")]
    InvalidInterval { minutes: f64 },

    #[error("invalid watcher interval {minutes}: the interval is too long to schedule")]
    IntervalTooLong { minutes: f64 },
}

/// Errors raised by the parameter validator. No request is made when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid type for query options. Must be an object.")]
    InvalidOptions,

    #[error("Malformed query parameter for resource \"{resource}\" and parameter: \"{parameter}\": {reason}")]
    MalformedParameter {
        resource: Resource,
        parameter: String,
        reason: FieldError,
    },
}

/// Errors returned once a request has been handed to the transport.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into a page.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request never produced a response (connect, TLS, timeout).
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Any error produced by the client's convenience API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
