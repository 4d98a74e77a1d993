use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use crate::span::SpanFuture;
use bytes::Bytes;
use http::{Method, Request};
use http_body_util::Full;
use std::fmt;
use tower::buffer::Buffer;

pub type BufferedService = Buffer<Request<Full<Bytes>>, SpanFuture<ResponseBody, HttpError>>;

/// Connection to one or more context brokers.
///
/// Clones share the connection pool and the buffer worker in front of it, so
/// one client can serve many tasks without a lock.
#[derive(Clone)]
pub struct HttpClient {
    service: BufferedService,
    max_body_size: usize,
    transport: TransportSecurity,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_body_size", &self.max_body_size)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    #[must_use]
    pub fn new(service: BufferedService, max_body_size: usize, transport: TransportSecurity) -> Self {
        Self {
            service,
            max_body_size,
            transport,
        }
    }

    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Start a request to an absolute `https://` (or, when allowed,
    /// `http://`) URL.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), method, url)
    }

    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    #[must_use]
    pub fn transport(&self) -> TransportSecurity {
        self.transport
    }

    #[must_use]
    pub fn into_service(self) -> BufferedService {
        self.service
    }
}
