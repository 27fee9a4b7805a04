// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GeoCoordinate, CoordinateField, LocationRecord, SkipReason, SkippedRecord};
pub use requests::{RankLocationsRequest, SearchLocationsRequest};
pub use responses::{RankLocationsResponse, RankedLocation, HealthResponse, ErrorResponse};
