use crate::config::ConfigError;
use http::StatusCode;
use ngsi2_http::HttpError;
use ngsi2_model::ErrorBody;
use thiserror::Error;

/// Longest slice of a non-NGSI error body kept in
/// [`Ngsi2Error::UnexpectedStatus`].
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Errors returned by [`Ngsi2Api`](crate::Ngsi2Api) operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Ngsi2Error {
    /// The broker answered with a non-2xx status and an NGSIv2 error body
    #[error("context broker returned {status}: {body}")]
    Broker { status: StatusCode, body: ErrorBody },

    /// Non-2xx status whose body is not an NGSIv2 error (proxy pages, empty bodies)
    #[error("unexpected HTTP {status}: {body_preview}")]
    UnexpectedStatus {
        status: StatusCode,
        body_preview: String,
    },

    #[error(transparent)]
    Http(#[from] HttpError),

    /// A 2xx body that does not decode into the expected type
    #[error("failed to decode broker response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A creation request succeeded but the response carried no usable `Location`
    #[error("broker response has no Location header")]
    MissingLocation,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Ngsi2Error {
    /// Build the error for a non-2xx response from its raw body.
    pub(crate) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(body) => Self::Broker { status, body },
            Err(_) => {
                let preview = &body[..body.len().min(ERROR_BODY_PREVIEW_LIMIT)];
                Self::UnexpectedStatus {
                    status,
                    body_preview: String::from_utf8_lossy(preview).into_owned(),
                }
            }
        }
    }

    /// HTTP status of a broker rejection, if this error carries one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Broker { status, .. } | Self::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn error_body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Broker { body, .. } => Some(body),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn ngsi_body_becomes_broker_error() {
        let err = Ngsi2Error::from_response(
            StatusCode::NOT_FOUND,
            br#"{"error":"NotFound","description":"The requested entity has not been found. Check type and id"}"#,
        );

        assert!(err.is_not_found());
        let body = err.error_body().unwrap();
        assert_eq!(body.error, "NotFound");
        assert!(err.to_string().starts_with("context broker returned 404 Not Found: NotFound"));
    }

    #[test]
    fn null_affected_items_keep_broker_error() {
        let err = Ngsi2Error::from_response(
            StatusCode::BAD_REQUEST,
            br#"{"error":"BadRequest","description":"Invalid characters in entity id","affectedItems":null}"#,
        );

        let body = err.error_body().unwrap();
        assert_eq!(body.error, "BadRequest");
        assert_eq!(body.description.as_deref(), Some("Invalid characters in entity id"));
        assert!(body.affected_items.is_empty());
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn foreign_body_becomes_unexpected_status() {
        let err = Ngsi2Error::from_response(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");

        match &err {
            Ngsi2Error::UnexpectedStatus {
                status,
                body_preview,
            } => {
                assert_eq!(*status, StatusCode::BAD_GATEWAY);
                assert_eq!(body_preview, "<html>bad gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.error_body().is_none());
        assert!(!err.is_not_found());
    }

    #[test]
    fn preview_is_capped() {
        let body = vec![b'x'; ERROR_BODY_PREVIEW_LIMIT * 2];
        let err = Ngsi2Error::from_response(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let Ngsi2Error::UnexpectedStatus { body_preview, .. } = err else {
            panic!("expected UnexpectedStatus");
        };
        assert_eq!(body_preview.len(), ERROR_BODY_PREVIEW_LIMIT);
    }

    #[test]
    fn transport_errors_have_no_status() {
        let err = Ngsi2Error::from(HttpError::ServiceClosed);
        assert_eq!(err.status(), None);
        assert!(Ngsi2Error::MissingLocation.status().is_none());
    }
}
