//! Error taxonomy for the digest pipeline.
//!
//! Only [`ConfigError`] and [`DeliveryError`] ever reach `main`. Feed and
//! generation failures are turned into data ([`crate::models::SourceStatus`]
//! and [`crate::models::SummaryResult`]) by the stage that observes them.

use std::time::Duration;

use thiserror::Error;

/// Why a single feed source yielded nothing.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, connection reset, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The body was not a feed `feed-rs` understands.
    #[error("feed parse error: {0}")]
    Parse(String),

    /// The per-source or run deadline elapsed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Unavailable(String),
}

/// Failure of the generative-text capability.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the request (auth, quota, bad model, ...).
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("{0}")]
    Unavailable(String),
}

/// The report could not be handed to the mail server.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("invalid address '{address}': {message}")]
    Address { address: String, message: String },

    #[error("could not build message: {0}")]
    Message(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Fatal startup error, raised before any network activity.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {setting}: {message}")]
    Invalid { setting: &'static str, message: String },

    #[error("invalid source registry: {0}")]
    Registry(String),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub fn invalid(setting: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            setting,
            message: message.into(),
        }
    }

    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry(message.into())
    }
}
