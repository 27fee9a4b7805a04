use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{format_distance, RankedRecord, Ranker};
use crate::models::{
    ErrorResponse, GeoCoordinate, HealthResponse, LocationRecord, RankLocationsRequest,
    RankLocationsResponse, RankedLocation, SearchLocationsRequest,
};
use crate::services::{GeocodingClient, GeocodingError, ListingClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub geocoder: Arc<GeocodingClient>,
    /// Record source used when a request carries no locations
    pub listing: Option<Arc<ListingClient>>,
    pub ranker: Ranker,
    /// Geocode the address of records that arrive without coordinates
    pub geocode_missing: bool,
}

/// Address lookups in flight while filling missing coordinates
const GEOCODE_CONCURRENCY: usize = 4;

/// Configure all location routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/locations/rank", web::post().to(rank_locations))
        .route("/locations/search", web::post().to(search_locations))
        .route("/locations/nearby", web::post().to(nearby_locations));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Rank locations around a known position
///
/// POST /api/v1/locations/rank
///
/// Request body:
/// ```json
/// {
///   "latitude": 59.9139,
///   "longitude": 10.7522,
///   "locations": [{"id": "a", "latitude": "59.92", "longitude": "10.76"}],
///   "limit": 20,
///   "maxDistanceKm": 50
/// }
/// ```
async fn rank_locations(
    state: web::Data<AppState>,
    req: web::Json<RankLocationsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let req = req.into_inner();
    let reference = GeoCoordinate::new(req.latitude, req.longitude);

    let records = match resolve_records(&state, req.locations).await {
        Ok(records) => records,
        Err(response) => return response,
    };

    ranked_response(&state.ranker, reference, None, records, req.limit, req.max_distance_km)
}

/// Geocode an address and rank locations around it
///
/// POST /api/v1/locations/search
///
/// Request body:
/// ```json
/// {
///   "address": "Karl Johans gate 1, Oslo",
///   "limit": 20
/// }
/// ```
async fn search_locations(
    state: web::Data<AppState>,
    req: web::Json<SearchLocationsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let req = req.into_inner();

    tracing::info!("Searching locations near address: {}", req.address);

    let reference = match state.geocoder.geocode(&req.address).await {
        Ok(coordinate) => coordinate,
        Err(e) => {
            tracing::error!("Failed to geocode '{}': {}", req.address, e);
            return geocoding_failed(e);
        }
    };

    let records = match resolve_records(&state, req.locations).await {
        Ok(records) => records,
        Err(response) => return response,
    };

    ranked_response(
        &state.ranker,
        reference,
        Some(req.address),
        records,
        req.limit,
        req.max_distance_km,
    )
}

/// Rank locations around the caller's own position
///
/// POST /api/v1/locations/nearby
///
/// The position is reverse geocoded so clients can show a display address;
/// a failed lookup still returns the ranking.
async fn nearby_locations(
    state: web::Data<AppState>,
    req: web::Json<RankLocationsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let req = req.into_inner();
    let reference = GeoCoordinate::new(req.latitude, req.longitude);

    let address = match state.geocoder.reverse_geocode(reference).await {
        Ok(address) => Some(address),
        Err(e) => {
            tracing::warn!(
                "Reverse geocoding ({}, {}) failed, ranking without address: {}",
                reference.latitude,
                reference.longitude,
                e
            );
            None
        }
    };

    let records = match resolve_records(&state, req.locations).await {
        Ok(records) => records,
        Err(response) => return response,
    };

    ranked_response(&state.ranker, reference, address, records, req.limit, req.max_distance_km)
}

/// Use the request's locations, or scrape the configured listing
///
/// With `geocode_missing` set, records lacking coordinates are geocoded
/// from their address before ranking.
async fn resolve_records(
    state: &AppState,
    locations: Option<Vec<LocationRecord>>,
) -> Result<Vec<LocationRecord>, HttpResponse> {
    let records = match (locations, &state.listing) {
        (Some(locations), _) => locations,
        (None, Some(listing)) => listing.fetch_all_records().await.map_err(|e| {
            tracing::error!("Failed to collect listing records from {}: {}", listing.page_url(), e);
            error_response(StatusCode::BAD_GATEWAY, "Failed to collect locations", e.to_string())
        })?,
        (None, None) => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Missing locations",
                "Request has no locations and no listing page is configured".to_string(),
            ));
        }
    };

    if !state.geocode_missing {
        return Ok(records);
    }

    Ok(state.geocoder.fill_missing_coordinates(records, GEOCODE_CONCURRENCY).await)
}

fn ranked_response(
    ranker: &Ranker,
    reference: GeoCoordinate,
    address: Option<String>,
    records: Vec<LocationRecord>,
    limit: Option<u16>,
    max_distance_km: Option<f64>,
) -> HttpResponse {
    let ranking = match ranker.rank(reference, records, limit.map(usize::from), max_distance_km) {
        Ok(ranking) => ranking,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, "Invalid coordinate", e.to_string());
        }
    };

    tracing::info!(
        "Ranked {} of {} locations around ({}, {}), {} skipped",
        ranking.ranked.len(),
        ranking.total_records,
        reference.latitude,
        reference.longitude,
        ranking.skipped.len()
    );

    HttpResponse::Ok().json(RankLocationsResponse {
        reference,
        address,
        locations: ranking.ranked.into_iter().map(to_ranked_location).collect(),
        skipped: ranking.skipped,
        total_records: ranking.total_records,
    })
}

fn to_ranked_location(entry: RankedRecord<LocationRecord>) -> RankedLocation {
    RankedLocation {
        id: entry.record.id,
        address: entry.record.address,
        latitude: entry.coordinate.latitude,
        longitude: entry.coordinate.longitude,
        distance_km: entry.distance_km,
        distance_label: format_distance(entry.distance_km),
        payload: entry.record.payload,
    }
}

fn geocoding_failed(error: GeocodingError) -> HttpResponse {
    let status = match error {
        GeocodingError::NoMatch(_) => StatusCode::NOT_FOUND,
        GeocodingError::EmptyAddress => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };

    error_response(status, "Failed to geocode address", error.to_string())
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: field_errors={:?}", errors);
    error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string())
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}
