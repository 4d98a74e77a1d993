use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Collected, LengthLimitError, Limited};
use std::pin::Pin;
use tower::BoxError;

/// Response body after decompression, type-erased.
pub type ResponseBody = BoxBody<Bytes, BoxError>;

/// A broker answer of any status.
///
/// The head is available immediately; [`bytes`](Self::bytes) drains the
/// body under the client's size limit.
#[derive(Debug)]
pub struct HttpResponse {
    inner: Response<ResponseBody>,
    max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn new(inner: Response<ResponseBody>, max_body_size: usize) -> Self {
        Self {
            inner,
            max_body_size,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Read the whole body, whatever the status.
    ///
    /// # Errors
    /// [`HttpError::BodyTooLarge`] once the decompressed body passes the
    /// limit, [`HttpError::Transport`] if the connection fails mid-body.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        let limit = self.max_body_size;
        // Erased to a `Send` trait object here, where the body type is concrete:
        // rustc cannot prove the `Limited` collect future `Send` once callers'
        // lifetimes are erased inside `async_trait` futures.
        let collect: Pin<Box<dyn Future<Output = Result<Collected<Bytes>, BoxError>> + Send>> =
            Box::pin(Limited::new(self.inner.into_body(), limit).collect());
        match collect.await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(err) if err.is::<LengthLimitError>() => Err(HttpError::BodyTooLarge { limit }),
            Err(err) => Err(HttpError::Transport(err)),
        }
    }
}
