use crate::models::GeoCoordinate;
use thiserror::Error;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

/// Errors raised when a coordinate is checked in strict mode
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("invalid coordinate ({latitude}, {longitude}): latitude must be within ±90 and longitude within ±180")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("coordinate ({latitude}, {longitude}) is not finite")]
    NonFinite { latitude: f64, longitude: f64 },
}

impl GeoCoordinate {
    /// Create a coordinate, rejecting values outside the valid ranges
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        let coordinate = Self::new(latitude, longitude);
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check that latitude is within [-90, 90] and longitude within [-180, 180]
    pub fn validate(&self) -> Result<(), CoordinateError> {
        let Self { latitude, longitude } = *self;

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NonFinite { latitude, longitude });
        }

        if latitude.abs() > MAX_LATITUDE || longitude.abs() > MAX_LONGITUDE {
            return Err(CoordinateError::InvalidCoordinate { latitude, longitude });
        }

        Ok(())
    }
}

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers. Any numeric input is accepted; out-of-range
/// degrees give a meaningless but finite result and non-finite input
/// yields a non-finite distance.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = lat2_rad - lat1_rad;
    let delta_lon = lon2.to_radians() - lon1.to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance in kilometers between two coordinates
#[inline]
pub fn compute_distance(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Format a distance for display, e.g. `1.99 km`
pub fn format_distance(distance_km: f64) -> String {
    format!("{:.2} km", distance_km)
}
