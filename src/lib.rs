//! Store Locator - distance ranking service for store locator widgets
//!
//! This library provides the great-circle distance engine used to order a
//! list of locations by proximity to a searched address or a user position,
//! together with adapters for geocoding and scraping listing pages.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Ranker, Ranking, rank_by_distance, distance::{compute_distance, haversine_distance}};
pub use crate::models::{GeoCoordinate, LocationRecord, RankLocationsRequest, RankLocationsResponse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let a = GeoCoordinate::new(40.7128, -74.0060);
        assert_eq!(compute_distance(a, a), 0.0);
    }
}
