//! `outgoing_http` span around every broker request.

use http::{Request, Response};
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{Instrument, Span, field};

/// Tenant header copied onto the span so multi-tenant traffic can be told apart.
const FIWARE_SERVICE: &str = "fiware-service";

pub type SpanFuture<B, E> = Pin<Box<dyn Future<Output = Result<Response<B>, E>> + Send>>;

#[derive(Debug, Clone, Copy, Default)]
pub struct OutgoingSpanLayer;

impl<S> Layer<S> for OutgoingSpanLayer {
    type Service = OutgoingSpan<S>;

    fn layer(&self, inner: S) -> Self::Service {
        OutgoingSpan { inner }
    }
}

/// Records `http.method`, `http.url` (without the query string),
/// `fiware.service` and, once known, `http.status_code`. Broker 4xx/5xx and
/// transport failures set `error=true`.
#[derive(Debug, Clone)]
pub struct OutgoingSpan<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for OutgoingSpan<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Display + 'static,
    ResBody: 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = SpanFuture<ResBody, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let span = request_span(&req);
        let response = self.inner.call(req);

        Box::pin(async move {
            let result = response.instrument(span.clone()).await;
            record_outcome(&span, &result);
            result
        })
    }
}

fn request_span<B>(req: &Request<B>) -> Span {
    let uri = req.uri();
    let url = format!(
        "{}://{}{}",
        uri.scheme_str().unwrap_or("http"),
        uri.authority().map_or("", http::uri::Authority::as_str),
        uri.path()
    );

    let span = tracing::info_span!(
        "outgoing_http",
        http.method = %req.method(),
        http.url = %url,
        fiware.service = field::Empty,
        http.status_code = field::Empty,
        error = field::Empty,
    );
    if let Some(tenant) = req
        .headers()
        .get(FIWARE_SERVICE)
        .and_then(|v| v.to_str().ok())
    {
        span.record("fiware.service", tenant);
    }
    span
}

fn record_outcome<B, E: Display>(span: &Span, result: &Result<Response<B>, E>) {
    match result {
        Ok(response) => {
            let status = response.status();
            span.record("http.status_code", status.as_u16());
            if status.is_client_error() || status.is_server_error() {
                span.record("error", true);
            }
            span.in_scope(|| tracing::debug!(status = status.as_u16(), "broker responded"));
        }
        Err(err) => {
            span.record("error", true);
            span.in_scope(|| tracing::debug!(error = %err, "request failed"));
        }
    }
}
