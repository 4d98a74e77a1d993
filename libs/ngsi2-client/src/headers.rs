//! Header names and response-header helpers.

use http::{HeaderMap, Uri};
use http::header::LOCATION;

/// Total number of results, sent when `options=count` was requested.
pub const X_TOTAL_COUNT: &str = "x-total-count";

/// FIWARE tenant.
pub const FIWARE_SERVICE: &str = "fiware-service";

/// FIWARE hierarchical scope within a tenant, e.g. `/Madrid/Gardens`.
pub const FIWARE_SERVICE_PATH: &str = "fiware-servicepath";

/// Read `X-Total-Count`. A missing or non-numeric header yields 0.
#[must_use]
pub fn extract_total_count(headers: &HeaderMap) -> u64 {
    headers
        .get(X_TOTAL_COUNT)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Id of a created resource: the last non-empty path segment of `Location`.
///
/// `/v2/subscriptions/57458eb60962ef754e7c0998` yields
/// `57458eb60962ef754e7c0998`; `/v2/entities/Room1?type=Room` yields `Room1`.
/// An absolute URL without a path (`http://orion:1026`) yields `None`.
#[must_use]
pub fn extract_id_from_location(headers: &HeaderMap) -> Option<String> {
    let location: Uri = headers.get(LOCATION)?.to_str().ok()?.parse().ok()?;
    let segment = location
        .path()
        .split('/')
        .rfind(|segment| !segment.is_empty())?;

    Some(match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_owned(),
    })
}
