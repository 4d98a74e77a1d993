//! Client configuration.
//!
//! Layers, lowest to highest precedence:
//! 1. built-in defaults
//! 2. a YAML file, when a path is given
//! 3. `NGSI2__*` environment variables (`NGSI2__BASE_URL`, `NGSI2__TIMEOUT`, ...)

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use ngsi2_http::TlsRootConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Prefix of the environment variables read by [`ClientConfig::load`].
pub const ENV_PREFIX: &str = "NGSI2__";

/// Default User-Agent sent to the broker.
pub const DEFAULT_USER_AGENT: &str = concat!("ngsi2-client/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(#[source] Box<figment::Error>),

    #[error("invalid configuration: {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Root certificates used for `https://` brokers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsRoots {
    #[default]
    WebPki,
    Native,
}

impl From<TlsRoots> for TlsRootConfig {
    fn from(roots: TlsRoots) -> Self {
        match roots {
            TlsRoots::WebPki => Self::WebPki,
            TlsRoots::Native => Self::Native,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Broker root, e.g. `http://orion:1026`. Required.
    pub base_url: String,

    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    pub user_agent: String,

    /// Upper bound for a response body, in bytes
    pub max_body_size: usize,

    /// Permit `http://` brokers
    pub allow_insecure_http: bool,

    pub tls_roots: TlsRoots,

    /// Sent as `Fiware-Service`
    pub service: Option<String>,

    /// Sent as `Fiware-ServicePath`
    pub service_path: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_body_size: 10 * 1024 * 1024,
            allow_insecure_http: false,
            tls_roots: TlsRoots::default(),
            service: None,
            service_path: None,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `base_url` with every other field defaulted.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load from defaults, an optional YAML file and the environment.
    ///
    /// The result is not validated; see [`ClientConfig::validate`].
    ///
    /// # Errors
    /// Returns [`ConfigError::NotFound`] for a missing file and
    /// [`ConfigError::Load`] for malformed YAML or values of the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Check the values a client cannot be built without.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("base_url", "must be set"));
        }
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::invalid("base_url", e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::invalid("base_url", "not a hierarchical URL"));
        }
        match url.scheme() {
            "https" => {}
            "http" if self.allow_insecure_http => {}
            "http" => {
                return Err(ConfigError::invalid(
                    "base_url",
                    "http:// requires allow_insecure_http",
                ));
            }
            other => {
                return Err(ConfigError::invalid(
                    "base_url",
                    format!("unsupported scheme '{other}'"),
                ));
            }
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::invalid("timeout", "must be greater than zero"));
        }
        Ok(url)
    }
}

/// `Duration` as a humantime string (`"30s"`, `"1m 30s"`).
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw)
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&raw), &"a duration"))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_body_size, 10 * 1024 * 1024);
        assert!(!config.allow_insecure_http);
        assert_eq!(config.tls_roots, TlsRoots::WebPki);
        assert!(config.user_agent.starts_with("ngsi2-client/"));
    }

    #[test]
    fn yaml_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url: http://orion.local:1026\ntimeout: 5s\nallow_insecure_http: true\nservice: smartcity\ntls_roots: native"
        )
        .unwrap();

        temp_env::with_vars(
            [
                ("NGSI2__TIMEOUT", Some("1m 30s")),
                ("NGSI2__SERVICE_PATH", Some("/Madrid")),
            ],
            || {
                let config = ClientConfig::load(Some(file.path())).unwrap();
                assert_eq!(config.base_url, "http://orion.local:1026");
                assert_eq!(config.timeout, Duration::from_secs(90));
                assert!(config.allow_insecure_http);
                assert_eq!(config.service.as_deref(), Some("smartcity"));
                assert_eq!(config.service_path.as_deref(), Some("/Madrid"));
                assert_eq!(config.tls_roots, TlsRoots::Native);
            },
        );
    }

    #[test]
    fn env_only() {
        temp_env::with_vars(
            [
                ("NGSI2__BASE_URL", Some("https://broker.example.com")),
                ("NGSI2__MAX_BODY_SIZE", Some("2048")),
            ],
            || {
                let config = ClientConfig::load(None).unwrap();
                assert_eq!(config.base_url, "https://broker.example.com");
                assert_eq!(config.max_body_size, 2048);
                assert!(config.validate().is_ok());
            },
        );
    }

    #[test]
    fn missing_file() {
        let err = ClientConfig::load(Some(Path::new("/nonexistent/ngsi2.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn bad_duration_fails_to_load() {
        temp_env::with_var("NGSI2__TIMEOUT", Some("soon"), || {
            let err = ClientConfig::load(None).unwrap_err();
            assert!(matches!(err, ConfigError::Load(_)));
        });
    }

    #[test]
    fn validate_rejects() {
        let cases = [
            (ClientConfig::default(), "base_url"),
            (ClientConfig::new("not a url"), "base_url"),
            (ClientConfig::new("mailto:ops@example.com"), "base_url"),
            (ClientConfig::new("http://orion:1026"), "base_url"),
            (ClientConfig::new("ftp://orion:1026"), "base_url"),
            (
                ClientConfig {
                    timeout: Duration::ZERO,
                    ..ClientConfig::new("https://orion:1026")
                },
                "timeout",
            ),
        ];

        for (config, expected) in cases {
            match config.validate() {
                Err(ConfigError::Invalid { field, .. }) => {
                    assert_eq!(field, expected, "config: {config:?}");
                }
                other => panic!("expected invalid {expected} for {config:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn validate_accepts_insecure_when_allowed() {
        let config = ClientConfig {
            allow_insecure_http: true,
            ..ClientConfig::new("http://orion:1026/")
        };
        let url = config.validate().unwrap();
        assert_eq!(url.as_str(), "http://orion:1026/");
    }

    #[test]
    fn duration_serializes_as_text() {
        let value = serde_json::to_value(ClientConfig::default()).unwrap();
        assert_eq!(value["timeout"], "30s");
        assert_eq!(value["tls_roots"], "webpki");
    }
}
