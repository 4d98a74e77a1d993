use std::time::Duration;

/// User-Agent sent when the caller does not choose one
pub const DEFAULT_USER_AGENT: &str = concat!("ngsi2-http/", env!("CARGO_PKG_VERSION"));

/// Trust anchors for broker certificates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsRootConfig {
    /// Mozilla roots compiled into the binary
    #[default]
    WebPki,
    /// The operating system certificate store
    Native,
}

/// URL schemes the transport agrees to connect to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportSecurity {
    /// `https://` only
    #[default]
    TlsOnly,
    /// `https://` and `http://`; Orion listens on plain `http://host:1026`
    /// out of the box
    AllowInsecureHttp,
}

/// Settings for one [`HttpClient`](crate::HttpClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Deadline for the response head; the body is read outside it
    pub timeout: Duration,
    /// Cap on a decompressed response body, in bytes
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
    pub tls_roots: TlsRootConfig,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::WebPki,
        }
    }
}

impl HttpClientConfig {
    /// Plain-HTTP preset for local mock brokers.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024,
            transport: TransportSecurity::AllowInsecureHttp,
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_requires_tls() {
        let config = HttpClientConfig::default();
        assert_eq!(config.transport, TransportSecurity::TlsOnly);
        assert_eq!(config.tls_roots, TlsRootConfig::WebPki);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_body_size, 10 * 1024 * 1024);
        assert!(config.user_agent.starts_with("ngsi2-http/"));
    }

    #[test]
    fn testing_preset_only_relaxes_transport_and_limits() {
        let config = HttpClientConfig::for_testing();
        assert_eq!(config.transport, TransportSecurity::AllowInsecureHttp);
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }
}
