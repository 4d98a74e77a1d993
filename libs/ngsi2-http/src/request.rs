use crate::client::HttpClient;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::response::HttpResponse;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Request, Uri};
use http_body_util::Full;
use serde::Serialize;
use tower::{BoxError, Service, ServiceExt};

/// One pending request, created by [`HttpClient::request`].
///
/// A bad header name or value is remembered and reported by
/// [`send`](Self::send) (or by [`json`](Self::json)), so calls can be
/// chained without intermediate `?`.
///
/// ```ignore
/// let resp = client
///     .request(Method::POST, "http://orion:1026/v2/entities")
///     .header("fiware-service", "smartcity")
///     .json(&entity)?
///     .send()
///     .await?;
/// ```
#[must_use = "a request is only sent by .send()"]
pub struct RequestBuilder {
    client: HttpClient,
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Bytes,
    error: Option<HttpError>,
}

impl RequestBuilder {
    pub fn new(client: HttpClient, method: Method, url: &str) -> Self {
        Self {
            client,
            method,
            url: url.to_owned(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Append a header; repeating a name sends it twice.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_none() {
            match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                (Ok(name), Ok(value)) => {
                    self.headers.append(name, value);
                }
                (Err(e), _) => self.error = Some(e.into()),
                (_, Err(e)) => self.error = Some(e.into()),
            }
        }
        self
    }

    pub fn headers<'a>(self, headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        headers
            .into_iter()
            .fold(self, |request, (name, value)| request.header(name, value))
    }

    /// Serialize `body` as the payload and mark it `application/json`.
    ///
    /// # Errors
    /// A header error recorded earlier, or [`HttpError::Json`].
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.body = Bytes::from(serde_json::to_vec(body)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    /// Send the request and wait for the response head.
    ///
    /// Every status comes back as `Ok`.
    ///
    /// # Errors
    /// A recorded header error, a URL the transport refuses, a timeout, or a
    /// connection failure.
    pub async fn send(self) -> Result<HttpResponse, HttpError> {
        let Self {
            client,
            method,
            url,
            headers,
            body,
            error,
        } = self;
        if let Some(err) = error {
            return Err(err);
        }

        let uri = target(&url, client.transport())?;
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(body))?;
        *request.headers_mut() = headers;

        let max_body_size = client.max_body_size();
        let mut service = client.into_service();
        let response = service
            .ready()
            .await
            .map_err(unbuffer)?
            .call(request)
            .await
            .map_err(unbuffer)?;

        Ok(HttpResponse::new(response, max_body_size))
    }
}

/// Parse `url` and check its scheme against the transport mode.
fn target(url: &str, transport: TransportSecurity) -> Result<Uri, HttpError> {
    let invalid = |reason: String| HttpError::InvalidUrl {
        url: url.to_owned(),
        reason,
    };
    let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| invalid(e.to_string()))?;
    if uri.authority().is_none() {
        return Err(invalid("an absolute URL with a host is required".to_owned()));
    }

    match (uri.scheme_str(), transport) {
        (Some("https"), _) | (Some("http"), TransportSecurity::AllowInsecureHttp) => Ok(uri),
        (Some("http"), TransportSecurity::TlsOnly) => Err(HttpError::InsecureScheme {
            url: url.to_owned(),
        }),
        (Some(scheme), _) => Err(HttpError::UnsupportedScheme {
            scheme: scheme.to_owned(),
        }),
        (None, _) => Err(invalid("missing scheme".to_owned())),
    }
}

/// The buffer hands back the inner `HttpError` boxed; anything else means
/// its worker is gone.
fn unbuffer(err: BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(err) => *err,
        Err(other) => {
            tracing::error!(error = %other, "HTTP client worker stopped");
            HttpError::ServiceClosed
        }
    }
}
