use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::services::DEFAULT_GEOCODER_ENDPOINT;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub listing: ListingSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,
    pub timeout_secs: Option<u64>,
    /// Geocode the address of records that arrive without coordinates
    #[serde(default)]
    pub fill_missing_coordinates: bool,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            endpoint: default_geocoder_endpoint(),
            timeout_secs: None,
            fill_missing_coordinates: false,
        }
    }
}

impl GeocodingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(10))
    }
}

fn default_geocoder_endpoint() -> String { DEFAULT_GEOCODER_ENDPOINT.to_string() }

/// Listing page scraped when a request carries no locations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingSettings {
    pub page_url: Option<String>,
    pub max_concurrent_pages: Option<usize>,
    pub max_pages: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl ListingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(30))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    /// Reject coordinates outside ±90/±180 instead of ranking them
    #[serde(default)]
    pub strict_coordinates: bool,
    pub default_limit: Option<usize>,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            strict_coordinates: false,
            default_limit: None,
            max_limit: default_max_limit(),
        }
    }
}

fn default_max_limit() -> usize { 500 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingSettings {
    /// Output format, with `LOG_FORMAT` taking precedence over the file
    pub fn effective_format(&self) -> String {
        pick_format(std::env::var("LOG_FORMAT").ok(), &self.format)
    }
}

fn pick_format(env: Option<String>, configured: &str) -> String {
    env.filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LOCATOR_)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LOCATOR__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("LOCATOR")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranking() {
        let ranking = RankingSettings::default();
        assert!(!ranking.strict_coordinates);
        assert_eq!(ranking.default_limit, None);
        assert_eq!(ranking.max_limit, 500);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_log_format_env_override() {
        assert_eq!(pick_format(Some("pretty".to_string()), "json"), "pretty");
        assert_eq!(pick_format(None, "json"), "json");
        assert_eq!(pick_format(Some("  ".to_string()), "plain"), "plain");
    }

    #[test]
    fn test_default_geocoding() {
        let geocoding = GeocodingSettings::default();
        assert!(geocoding.endpoint.contains("GeocodeServer"));
        assert_eq!(geocoding.timeout(), Duration::from_secs(10));
        assert!(!geocoding.fill_missing_coordinates);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("store-locator-config-test.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            host = "127.0.0.1"
            port = 9090

            [listing]
            page_url = "https://site.test/stores"
            max_concurrent_pages = 2
            max_pages = 20

            [geocoding]
            fill_missing_coordinates = true

            [ranking]
            strict_coordinates = true
            default_limit = 25
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.listing.page_url.as_deref(), Some("https://site.test/stores"));
        assert_eq!(settings.listing.max_concurrent_pages, Some(2));
        assert_eq!(settings.listing.max_pages, Some(20));
        assert!(settings.geocoding.fill_missing_coordinates);
        assert!(settings.geocoding.endpoint.contains("GeocodeServer"));
        assert!(settings.ranking.strict_coordinates);
        assert_eq!(settings.ranking.default_limit, Some(25));
        assert_eq!(settings.ranking.max_limit, 500);
        assert_eq!(settings.logging.level, "info");
    }
}
