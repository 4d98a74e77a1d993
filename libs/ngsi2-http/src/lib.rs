#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP transport for the NGSIv2 client
//!
//! ```text
//! Buffer -> OutgoingSpan -> Timeout -> User-Agent -> Decompression -> hyper pool (rustls)
//! ```
//!
//! Every broker answer, 2xx or not, comes back as an [`HttpResponse`]; only
//! failures below the status line are [`HttpError`]s. Nothing is retried and
//! redirects are not followed.
//!
//! ```ignore
//! use http::Method;
//! use ngsi2_http::HttpClient;
//!
//! let client = HttpClient::builder().build()?;
//! let resp = client
//!     .request(Method::GET, "https://orion.example.com/v2/entities")
//!     .header("fiware-service", "smartcity")
//!     .send()
//!     .await?;
//! let body = resp.bytes().await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod request;
mod response;
mod span;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TlsRootConfig, TransportSecurity};
pub use error::HttpError;
pub use request::RequestBuilder;
pub use response::HttpResponse;
