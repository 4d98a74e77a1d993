//! Geographical query filters (`georel`, `geometry`, `coords`).
//!
//! These types only appear in query strings, so they render through
//! [`Display`](fmt::Display) and parse through [`FromStr`].

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseGeoError {
    #[error("unknown geometry '{0}'")]
    UnknownGeometry(String),
    #[error("unknown geo relation '{0}'")]
    UnknownRelation(String),
    #[error("unknown distance modifier '{0}'")]
    UnknownModifier(String),
    #[error("invalid number '{value}' in {context}")]
    InvalidNumber { value: String, context: &'static str },
    #[error("coordinate '{0}' must be 'latitude,longitude'")]
    MalformedCoordinate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceModifier {
    MaxDistance,
    MinDistance,
}

impl fmt::Display for DistanceModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MaxDistance => "maxDistance",
            Self::MinDistance => "minDistance",
        })
    }
}

impl FromStr for DistanceModifier {
    type Err = ParseGeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maxDistance" => Ok(Self::MaxDistance),
            "minDistance" => Ok(Self::MinDistance),
            other => Err(ParseGeoError::UnknownModifier(other.to_owned())),
        }
    }
}

/// Spatial relationship between matching entities and the reference shape.
///
/// Only `Near` carries a distance; it renders as `near;maxDistance:1000`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoRelation {
    Near {
        modifier: DistanceModifier,
        /// Meters
        distance: f64,
    },
    CoveredBy,
    Intersects,
    Equals,
    Disjoint,
}

impl fmt::Display for GeoRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Near { modifier, distance } => write!(f, "near;{modifier}:{distance}"),
            Self::CoveredBy => f.write_str("coveredBy"),
            Self::Intersects => f.write_str("intersects"),
            Self::Equals => f.write_str("equals"),
            Self::Disjoint => f.write_str("disjoint"),
        }
    }
}

impl FromStr for GeoRelation {
    type Err = ParseGeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coveredBy" => return Ok(Self::CoveredBy),
            "intersects" => return Ok(Self::Intersects),
            "equals" => return Ok(Self::Equals),
            "disjoint" => return Ok(Self::Disjoint),
            _ => {}
        }

        let Some(rest) = s.strip_prefix("near;") else {
            return Err(ParseGeoError::UnknownRelation(s.to_owned()));
        };
        let (modifier, distance) = rest
            .split_once(':')
            .ok_or_else(|| ParseGeoError::UnknownRelation(s.to_owned()))?;
        let distance = distance
            .parse::<f64>()
            .map_err(|_| ParseGeoError::InvalidNumber {
                value: distance.to_owned(),
                context: "near distance",
            })?;
        Ok(Self::Near {
            modifier: modifier.parse()?,
            distance,
        })
    }
}

/// Reference shape kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Point,
    Line,
    Polygon,
    Box,
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::Box => "box",
        })
    }
}

impl FromStr for Geometry {
    type Err = ParseGeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(Self::Point),
            "line" => Ok(Self::Line),
            "polygon" => Ok(Self::Polygon),
            "box" => Ok(Self::Box),
            other => Err(ParseGeoError::UnknownGeometry(other.to_owned())),
        }
    }
}

/// WGS84 position, rendered `latitude,longitude`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = ParseGeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| ParseGeoError::MalformedCoordinate(s.to_owned()))?;
        let number = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| ParseGeoError::InvalidNumber {
                    value: value.to_owned(),
                    context: "coordinate",
                })
        };
        Ok(Self::new(number(lat)?, number(lon)?))
    }
}

/// A complete geographical filter. All three parts are sent together.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoQuery {
    pub relation: GeoRelation,
    pub geometry: Geometry,
    pub coordinates: Vec<Coordinate>,
}

impl GeoQuery {
    pub fn new(relation: GeoRelation, geometry: Geometry, coordinates: Vec<Coordinate>) -> Self {
        Self {
            relation,
            geometry,
            coordinates,
        }
    }

    /// Value of the `coords` query parameter: coordinates joined by `;`.
    #[must_use]
    pub fn coords_param(&self) -> String {
        self.coordinates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Parse a `coords` parameter back into coordinates.
    ///
    /// # Errors
    /// Returns [`ParseGeoError`] for any malformed coordinate.
    pub fn parse_coords(coords: &str) -> Result<Vec<Coordinate>, ParseGeoError> {
        coords.split(';').map(str::parse).collect()
    }
}
