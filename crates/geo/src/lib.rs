//! Geospatial utilities for FoodBridge.
//!
//! This crate provides:
//! - Haversine distance calculations in kilometers and miles
//! - A [`DistanceUnit`] selector so search radius and distances share a unit
//! - Batch distance calculation with optional parallelism
//!
//! # Example
//!
//! ```
//! use foodbridge_geo::{haversine_distance, Coordinate};
//!
//! let union_square = Coordinate::new(37.7880, -122.4075);
//! let ferry_building = Coordinate::new(37.7955, -122.3937);
//!
//! let distance_km = haversine_distance(&union_square, &ferry_building);
//! assert!(distance_km > 1.0 && distance_km < 2.0);
//! ```

mod haversine;
pub mod batch;
mod error;

pub use haversine::{
    haversine_distance, haversine_distance_miles, DistanceUnit, EARTH_RADIUS_KM, EARTH_RADIUS_MI,
};
pub use batch::distances_from;
pub use error::{GeoError, Result};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate without range checks.
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    /// Returns [`GeoError::InvalidCoordinate`] when either component is NaN,
    /// infinite, or outside its range.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({latitude}, {longitude}) is outside [-90,90] x [-180,180]"
            )))
        }
    }

    /// Returns true if the coordinate has finite, in-range values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_try_new() {
        assert!(Coordinate::try_new(37.7749, -122.4194).is_ok());
        let err = Coordinate::try_new(120.0, 0.0).unwrap_err();
        assert!(matches!(err, GeoError::InvalidCoordinate(_)));
    }

    #[test]
    fn test_coordinate_from_tuple() {
        let coord: Coordinate = (37.7749, -122.4194).into();
        assert_eq!(coord.latitude, 37.7749);
        assert_eq!(coord.longitude, -122.4194);
    }
}
