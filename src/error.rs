//! Error types for the endpoint lifecycle and query parsing.

use thiserror::Error;

/// Errors surfaced by the API server lifecycle.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The configured CORS origin patterns did not compile into a single
    /// combined regex. Fatal to `start`; nothing is bound when this is
    /// returned.
    #[error("failed to compile combined CORS allowed origins into regex: {source}")]
    CorsCompile {
        #[source]
        source: regex::Error,
    },

    /// Binding the listener failed (bad address, port in use).
    #[error("failed to bind api server listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// TLS material could not be loaded.
    #[error("failed to load TLS certificate/key: {0}")]
    Tls(#[source] std::io::Error),

    /// `start` was called while the server is already running.
    #[error("api server is already running")]
    AlreadyRunning,

    /// `shutdown` was called while the server is not running.
    #[error("api server is not running")]
    NotRunning,

    /// `start` was called on an instance that already served its lifetime.
    /// A manager is single-use; construct a fresh one to restart.
    #[error("api server has already been shut down and cannot be restarted")]
    Finished,
}

/// A `match_target` selector that could not be parsed.
#[derive(Debug, Error)]
#[error("invalid target selector {input:?}: {reason}")]
pub struct SelectorError {
    pub input: String,
    pub reason: &'static str,
}
