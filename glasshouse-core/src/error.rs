use thiserror::Error;

/// Crate-wide error type.
///
/// Per spec.md §7, no error type crosses the router boundary — the router's
/// contract to handlers is infallible. `GlassError` covers everything below
/// that boundary: transport setup, configuration, and the dissector.
#[derive(Error, Debug)]
pub enum GlassError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("ClientHello dissection error: {0}")]
    Dissect(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    #[error("No private key found in key file")]
    NoPrivateKey,
}

pub type Result<T> = std::result::Result<T, GlassError>;
