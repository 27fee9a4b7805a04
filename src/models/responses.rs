use serde::{Deserialize, Serialize};
use crate::models::domain::{GeoCoordinate, SkippedRecord};

/// A location with its distance from the reference point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedLocation {
    pub id: Option<String>,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "distanceLabel")]
    pub distance_label: String,
    pub payload: serde_json::Value,
}

/// Response for the ranking endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankLocationsResponse {
    pub reference: GeoCoordinate,
    /// Display address of the reference point, when it was geocoded
    pub address: Option<String>,
    pub locations: Vec<RankedLocation>,
    pub skipped: Vec<SkippedRecord>,
    #[serde(rename = "totalRecords")]
    pub total_records: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
