use crate::core::Locatable;
use crate::models::{CoordinateField, GeoCoordinate, LocationRecord, SkipReason};
use futures::{stream, StreamExt};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Public ArcGIS World geocoding service
pub const DEFAULT_GEOCODER_ENDPOINT: &str =
    "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer";

/// Errors that can occur when talking to the geocoding service
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned error: {0}")]
    ApiError(String),

    #[error("No match found for {0}")]
    NoMatch(String),

    #[error("Address must not be empty")]
    EmptyAddress,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Geocoding client
///
/// Resolves free-text addresses to coordinates and coordinates back to a
/// display address using the ArcGIS `find` and `reverseGeocode` operations.
pub struct GeocodingClient {
    base_url: String,
    client: Client,
}

impl GeocodingClient {
    /// Create a new geocoding client
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, GeocodingError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }

    /// Look up the coordinate of the best match for `address`
    pub async fn geocode(&self, address: &str) -> Result<GeoCoordinate, GeocodingError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodingError::EmptyAddress);
        }

        let url = format!(
            "{}/find?text={}&f=pjson",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(address)
        );

        tracing::debug!("Geocoding address via: {}", url);

        let json = self.get_json(&url).await?;

        let locations = json
            .get("locations")
            .and_then(|l| l.as_array())
            .ok_or_else(|| GeocodingError::InvalidResponse("Missing locations array".into()))?;

        let geometry = locations
            .first()
            .and_then(|location| location.pointer("/feature/geometry"))
            .ok_or_else(|| GeocodingError::NoMatch(format!("address '{}'", address)))?;

        // y is latitude and x is longitude; zero is a legitimate value
        let latitude = geometry.get("y").and_then(Value::as_f64);
        let longitude = geometry.get("x").and_then(Value::as_f64);

        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => {
                tracing::debug!("Geocoded '{}' to ({}, {})", address, latitude, longitude);
                Ok(GeoCoordinate::new(latitude, longitude))
            }
            _ => Err(GeocodingError::NoMatch(format!("address '{}'", address))),
        }
    }

    /// Look up a display address for a coordinate
    pub async fn reverse_geocode(&self, coordinate: GeoCoordinate) -> Result<String, GeocodingError> {
        let url = format!(
            "{}/reverseGeocode?location={},{}&f=pjson",
            self.base_url.trim_end_matches('/'),
            coordinate.longitude,
            coordinate.latitude
        );

        tracing::debug!("Reverse geocoding via: {}", url);

        let json = self.get_json(&url).await?;

        json.pointer("/address/Match_addr")
            .and_then(Value::as_str)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                GeocodingError::NoMatch(format!(
                    "coordinate ({}, {})",
                    coordinate.latitude, coordinate.longitude
                ))
            })
    }

    /// Geocode the address of every record that lacks a coordinate
    ///
    /// Records that already carry coordinates, or whose coordinates are
    /// present but unusable, pass through untouched. A failed lookup leaves
    /// the record as it was so that ranking reports it as skipped. Order is
    /// preserved and at most `concurrency` lookups run at once.
    pub async fn fill_missing_coordinates(
        &self,
        records: Vec<LocationRecord>,
        concurrency: usize,
    ) -> Vec<LocationRecord> {
        stream::iter(records)
            .map(|record| self.fill_record(record))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    async fn fill_record(&self, mut record: LocationRecord) -> LocationRecord {
        if record.coordinate() != Err(SkipReason::MissingCoordinate) {
            return record;
        }
        let Some(address) = record.address.clone().filter(|a| !a.trim().is_empty()) else {
            return record;
        };

        match self.geocode(&address).await {
            Ok(coordinate) => {
                record.latitude = Some(CoordinateField::Number(coordinate.latitude));
                record.longitude = Some(CoordinateField::Number(coordinate.longitude));
            }
            Err(e) => {
                tracing::warn!(
                    "Could not geocode record {:?} ('{}'): {}",
                    record.id,
                    address,
                    e
                );
            }
        }

        record
    }

    async fn get_json(&self, url: &str) -> Result<Value, GeocodingError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(GeocodingError::ApiError(format!(
                "Geocoder request failed: {}",
                response.status()
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| GeocodingError::InvalidResponse(e.to_string()))?;

        // ArcGIS reports failures as a 200 with an error object
        if let Some(error) = json.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(GeocodingError::ApiError(message.to_string()));
        }

        Ok(json)
    }
}
