use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::LocationRecord;

/// Request to rank locations around a known position
///
/// Used by both `/locations/rank` and `/locations/nearby`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankLocationsRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Locations to rank; the configured listing page is scraped when absent
    #[serde(default)]
    pub locations: Option<Vec<LocationRecord>>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "max_distance_km", rename = "maxDistanceKm")]
    pub max_distance_km: Option<f64>,
}

/// Request to geocode a free-text address and rank locations around it
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchLocationsRequest {
    #[validate(length(min = 1))]
    pub address: String,
    #[serde(default)]
    pub locations: Option<Vec<LocationRecord>>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "max_distance_km", rename = "maxDistanceKm")]
    pub max_distance_km: Option<f64>,
}
