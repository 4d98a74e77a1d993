use http::header::{InvalidHeaderName, InvalidHeaderValue};
use std::time::Duration;
use thiserror::Error;
use tower::BoxError;

/// Failures below the HTTP status line.
///
/// A broker answering 4xx/5xx is not an `HttpError`; the response is handed
/// back as-is.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] InvalidHeaderName),

    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),

    #[error("cannot build request: {0}")]
    Request(#[from] http::Error),

    /// Not an absolute `http(s)://host/...` URL
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// `http://` while the transport is [`TlsOnly`](crate::TransportSecurity::TlsOnly)
    #[error("plain HTTP is not allowed for '{url}'")]
    InsecureScheme { url: String },

    #[error("unsupported URL scheme '{scheme}'")]
    UnsupportedScheme { scheme: String },

    #[error("no response within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connect, I/O, protocol or decompression failure
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("cannot encode JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The buffer worker that owns the connection pool has stopped
    #[error("HTTP client worker has shut down")]
    ServiceClosed,
}
