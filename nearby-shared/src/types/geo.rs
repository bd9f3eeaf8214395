//! Geographic point type.
//!
//! Points are persisted as GeoJSON `Point` objects whose coordinates are in
//! `[longitude, latitude]` order. Validation happens on construction and on
//! deserialization, so a `GeoPoint` value always holds a valid coordinate pair.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Earth radius used for spherical distance, in meters.
///
/// Matches the radius used by spherical `$geoNear` queries so that distances
/// computed here line up with those reported by a document store.
pub const EARTH_RADIUS_METERS: f64 = 6_378_100.0;

/// Error returned when a coordinate pair is out of range or not finite.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidCoordinate {
    pub lng: f64,
    pub lat: f64,
}

impl fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid coordinate pair (lng={}, lat={}): longitude must be within [-180, 180] and latitude within [-90, 90]",
            self.lng, self.lat
        )
    }
}

impl std::error::Error for InvalidCoordinate {}

/// A validated geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoJsonPoint", into = "GeoJsonPoint")]
pub struct GeoPoint {
    lng: f64,
    lat: f64,
}

impl GeoPoint {
    /// Create a point from longitude and latitude (GeoJSON order).
    ///
    /// # Example
    ///
    /// ```
    /// use nearby_shared::GeoPoint;
    ///
    /// let point = GeoPoint::new(77.0, 28.0).unwrap();
    /// assert_eq!(point.lat(), 28.0);
    /// assert!(GeoPoint::new(200.0, 0.0).is_err());
    /// ```
    pub fn new(lng: f64, lat: f64) -> Result<Self, InvalidCoordinate> {
        let valid = lng.is_finite()
            && lat.is_finite()
            && (-180.0..=180.0).contains(&lng)
            && (-90.0..=90.0).contains(&lat);

        if valid {
            Ok(Self { lng, lat })
        } else {
            Err(InvalidCoordinate { lng, lat })
        }
    }

    /// Create a point from latitude and longitude, in the order search requests use.
    pub fn from_lat_lng(lat: f64, lng: f64) -> Result<Self, InvalidCoordinate> {
        Self::new(lng, lat)
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Great-circle distance to another point in meters (haversine).
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        // Rounding can push `a` past 1 near antipodal points.
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }
}

/// Wire representation: `{"type": "Point", "coordinates": [lng, lat]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeoJsonPoint {
    #[serde(rename = "type")]
    kind: PointKind,
    coordinates: [f64; 2],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum PointKind {
    Point,
}

impl TryFrom<GeoJsonPoint> for GeoPoint {
    type Error = InvalidCoordinate;

    fn try_from(value: GeoJsonPoint) -> Result<Self, Self::Error> {
        let [lng, lat] = value.coordinates;
        GeoPoint::new(lng, lat)
    }
}

impl From<GeoPoint> for GeoJsonPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            kind: PointKind::Point,
            coordinates: [point.lng, point.lat],
        }
    }
}
