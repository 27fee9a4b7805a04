use serde::{Deserialize, Serialize};

/// A point on Earth's surface in decimal degrees
///
/// Construction does not check ranges; use [`GeoCoordinate::try_new`] or
/// [`GeoCoordinate::validate`] when out-of-range values must be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<GeoCoordinate> for geo::Point<f64> {
    fn from(coordinate: GeoCoordinate) -> Self {
        geo::Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<geo::Point<f64>> for GeoCoordinate {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// A latitude or longitude as it arrives from a record source
///
/// Page markup delivers coordinates as text while JSON clients send numbers,
/// so both are accepted and parsed lazily during ranking. Any other JSON
/// value is kept so the record can be reported instead of failing the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateField {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl CoordinateField {
    /// Parse the field into degrees
    ///
    /// Blank text counts as missing. Text such as `"NaN"` parses to a
    /// non-finite value and is left for the caller to surface.
    pub fn degrees(&self) -> Result<f64, SkipReason> {
        match self {
            CoordinateField::Number(value) => Ok(*value),
            CoordinateField::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(SkipReason::MissingCoordinate);
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| SkipReason::NonNumericCoordinate)
            }
            CoordinateField::Other(_) => Err(SkipReason::NonNumericCoordinate),
        }
    }
}

impl From<f64> for CoordinateField {
    fn from(value: f64) -> Self {
        CoordinateField::Number(value)
    }
}

impl From<&str> for CoordinateField {
    fn from(value: &str) -> Self {
        CoordinateField::Text(value.to_string())
    }
}

/// A location entry supplied by a client or scraped from a listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<CoordinateField>,
    #[serde(default)]
    pub longitude: Option<CoordinateField>,
    /// Opaque caller data, returned untouched
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl LocationRecord {
    pub fn new(
        id: impl Into<String>,
        latitude: impl Into<CoordinateField>,
        longitude: impl Into<CoordinateField>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            address: None,
            latitude: Some(latitude.into()),
            longitude: Some(longitude.into()),
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Why a record was left out of a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    #[error("coordinate is missing")]
    MissingCoordinate,

    #[error("coordinate is not a number")]
    NonNumericCoordinate,

    #[error("coordinate is outside the valid latitude/longitude range")]
    OutOfRange,
}

/// A record excluded from ranking, identified by its input position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub id: Option<String>,
    pub reason: SkipReason,
}
