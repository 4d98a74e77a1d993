//! rustls connector for broker connections.

use crate::config::{TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::RootCertStore;
use rustls::crypto::CryptoProvider;
use std::sync::Arc;

/// The process-wide provider when one is installed, aws-lc-rs otherwise.
fn provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

fn native_roots() -> Result<RootCertStore, HttpError> {
    let loaded = rustls_native_certs::load_native_certs();
    for err in &loaded.errors {
        tracing::warn!(error = %err, "skipping unreadable OS certificate");
    }

    let mut store = RootCertStore::empty();
    let (added, ignored) = store.add_parsable_certificates(loaded.certs);
    tracing::debug!(added, ignored, "loaded OS root certificates");

    if added == 0 {
        return Err(HttpError::Tls(
            "the OS certificate store has no usable root certificate".to_owned(),
        ));
    }
    Ok(store)
}

/// HTTPS connector advertising h2 and http/1.1 over ALPN. Plain `http://`
/// is only dialled under [`TransportSecurity::AllowInsecureHttp`].
///
/// # Errors
/// Returns [`HttpError::Tls`] when the root store cannot be set up.
pub fn https_connector(
    roots: TlsRootConfig,
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = match roots {
        TlsRootConfig::WebPki => HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(provider())
            .map_err(|e| HttpError::Tls(e.to_string()))?,
        TlsRootConfig::Native => {
            let tls = rustls::ClientConfig::builder_with_provider(provider())
                .with_safe_default_protocol_versions()
                .map_err(|e| HttpError::Tls(e.to_string()))?
                .with_root_certificates(native_roots()?)
                .with_no_client_auth();
            HttpsConnectorBuilder::new().with_tls_config(tls)
        }
    };

    let builder = match transport {
        TransportSecurity::TlsOnly => builder.https_only(),
        TransportSecurity::AllowInsecureHttp => builder.https_or_http(),
    };
    Ok(builder.enable_all_versions().build())
}
