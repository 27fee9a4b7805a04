use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use std::sync::Arc;
use store_locator::config::Settings;
use store_locator::core::Ranker;
use store_locator::routes::{self, AppState};
use store_locator::services::{GeocodingClient, ListingClient, DEFAULT_MAX_PAGES};
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match format {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    match &settings {
        Ok(settings) => init_logging(&settings.logging.level, &settings.logging.effective_format()),
        Err(_) => init_logging(
            "info",
            &std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
        ),
    }

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!("Starting store locator service...");

    let geocoder = GeocodingClient::new(settings.geocoding.endpoint.clone(), settings.geocoding.timeout())
        .map_err(|e| {
            error!("Failed to create geocoding client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e)
        })?;

    info!("Geocoding client initialized ({})", settings.geocoding.endpoint);
    if settings.geocoding.fill_missing_coordinates {
        info!("Records without coordinates will be geocoded from their address");
    }

    let listing = match &settings.listing.page_url {
        Some(page_url) => {
            let client = ListingClient::new(
                page_url.clone(),
                settings.listing.max_concurrent_pages.unwrap_or(4),
                settings.listing.timeout(),
            )
            .map_err(|e| {
                error!("Failed to create listing client: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e)
            })?
            .with_max_pages(settings.listing.max_pages.unwrap_or(DEFAULT_MAX_PAGES));
            info!("Listing source configured: {}", page_url);
            Some(Arc::new(client))
        }
        None => {
            info!("No listing source configured, requests must carry locations");
            None
        }
    };

    let ranker = Ranker::new(
        settings.ranking.strict_coordinates,
        settings.ranking.default_limit,
        settings.ranking.max_limit,
    );

    info!("Ranker initialized: {:?}", ranker);

    // Build application state
    let app_state = AppState {
        geocoder: Arc::new(geocoder),
        listing,
        ranker,
        geocode_missing: settings.geocoding.fill_missing_coordinates,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
