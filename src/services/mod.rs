// Service exports
pub mod geocoding;
pub mod listing;

pub use geocoding::{GeocodingClient, GeocodingError, DEFAULT_GEOCODER_ENDPOINT};
pub use listing::{ListingClient, ListingError, DEFAULT_MAX_PAGES};
