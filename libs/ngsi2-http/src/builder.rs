use crate::client::{BufferedService, HttpClient};
use crate::config::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use crate::response::ResponseBody;
use crate::span::OutgoingSpanLayer;
use crate::tls;
use bytes::Bytes;
use http::header::{HeaderValue, USER_AGENT};
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower::{BoxError, Layer, ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;
use tower_http::set_header::SetRequestHeaderLayer;

/// Requests queued in front of the connection pool before callers wait.
const QUEUE_CAPACITY: usize = 64;

/// Idle broker connections are closed after this long.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Builder for an [`HttpClient`].
#[derive(Debug, Clone, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// Limit on the wait for the response head; body reads are not covered.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    #[must_use]
    pub fn tls_roots(mut self, tls_roots: TlsRootConfig) -> Self {
        self.config.tls_roots = tls_roots;
        self
    }

    /// Assemble the middleware stack and spawn its buffer worker.
    ///
    /// Request flow, outer to inner:
    /// `Buffer -> OutgoingSpan -> Timeout -> User-Agent -> Decompression -> hyper`.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// [`HttpError::InvalidHeaderValue`] for an unusable user agent,
    /// [`HttpError::Tls`] when the root store cannot be loaded.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let HttpClientConfig {
            timeout,
            max_body_size,
            user_agent,
            transport,
            tls_roots,
        } = self.config;

        if transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!("plain http:// allowed; broker traffic may travel unencrypted");
        }

        let user_agent = HeaderValue::from_str(&user_agent)?;
        let connector = tls::https_connector(tls_roots, transport)?;
        let pool = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build::<_, Full<Bytes>>(connector);

        let stack = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(SetRequestHeaderLayer::if_not_present(USER_AGENT, user_agent))
            .layer(DecompressionLayer::new())
            .service(pool)
            .map_response(into_response_body)
            .map_err(move |err: BoxError| classify(err, timeout));

        let service: BufferedService = Buffer::new(OutgoingSpanLayer.layer(stack), QUEUE_CAPACITY);
        tracing::debug!(
            timeout_ms = timeout.as_millis(),
            max_body_size,
            "HTTP client ready"
        );

        Ok(HttpClient::new(service, max_body_size, transport))
    }
}

fn classify(err: BoxError, timeout: Duration) -> HttpError {
    if err.is::<Elapsed>() {
        HttpError::Timeout(timeout)
    } else {
        HttpError::Transport(err)
    }
}

fn into_response_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<BoxError>,
{
    response.map(|body| body.map_err(Into::into).boxed())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io;
    use tracing_test::traced_test;

    #[test]
    fn elapsed_becomes_timeout() {
        let err = classify(Box::new(Elapsed::new()), Duration::from_millis(250));
        assert!(matches!(err, HttpError::Timeout(d) if d == Duration::from_millis(250)));

        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err = classify(Box::new(refused), Duration::from_millis(250));
        assert!(matches!(err, HttpError::Transport(_)));
    }

    #[test]
    fn setters_land_in_config() {
        let builder = HttpClientBuilder::new()
            .timeout(Duration::from_secs(3))
            .user_agent("orion-sync/2.0")
            .max_body_size(4096)
            .transport(TransportSecurity::AllowInsecureHttp)
            .tls_roots(TlsRootConfig::Native);

        assert_eq!(builder.config.timeout, Duration::from_secs(3));
        assert_eq!(builder.config.user_agent, "orion-sync/2.0");
        assert_eq!(builder.config.max_body_size, 4096);
        assert_eq!(builder.config.transport, TransportSecurity::AllowInsecureHttp);
        assert_eq!(builder.config.tls_roots, TlsRootConfig::Native);
    }

    #[tokio::test]
    async fn user_agent_with_newline_is_rejected() {
        let result = HttpClientBuilder::new()
            .user_agent("ngsi2\nInjected: yes")
            .build();
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }

    #[tokio::test]
    #[traced_test]
    async fn insecure_transport_is_logged() {
        HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap();
        assert!(logs_contain("plain http:// allowed"));
    }

    #[tokio::test]
    #[traced_test]
    async fn tls_only_stays_quiet() {
        HttpClientBuilder::new().build().unwrap();
        assert!(!logs_contain("plain http:// allowed"));
    }
}
