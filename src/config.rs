use dotenvy::dotenv;
use log::error;
use serde::Deserialize;
use std::env;

const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Selects the in-process store instead of Postgres.
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub http_bind_address: String,
    #[serde(default = "default_pool_size")]
    pub db_pool_size: u32,
    /// HS256 secret used to verify bearer tokens. Tokens are decoded without
    /// verification when unset.
    pub auth_hmac_secret: Option<String>,
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
    #[serde(default = "default_geocoder_user_agent")]
    pub geocoder_user_agent: String,
    #[serde(default = "default_search_radius_km")]
    pub search_radius_km: f64,
    #[serde(default = "default_url_sync_interval_ms")]
    pub url_sync_interval_ms: u64,
}

fn default_bind_address() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocoder_user_agent() -> String {
    "rentals-api".to_string()
}

fn default_search_radius_km() -> f64 {
    crate::search::DEFAULT_RADIUS_KM
}

fn default_url_sync_interval_ms() -> u64 {
    300
}

pub fn create_test_config() -> Config {
    Config {
        database_url: MEMORY_DATABASE_URL.to_string(),
        http_bind_address: default_bind_address(),
        db_pool_size: 1,
        auth_hmac_secret: None,
        geocoder_url: "http://localhost:0".to_string(),
        geocoder_user_agent: default_geocoder_user_agent(),
        search_radius_km: default_search_radius_km(),
        url_sync_interval_ms: default_url_sync_interval_ms(),
    }
}

pub fn read_config() -> Config {
    dotenv().ok();
    env::var(CONFIG_PATH_ENV)
        .map_err(|_| format!("{CONFIG_PATH_ENV} .env not set"))
        .and_then(|config_path| std::fs::read(config_path).map_err(|e| e.to_string()))
        .and_then(|bytes| toml::from_slice(&bytes).map_err(|e| e.to_string()))
        .unwrap_or_else(|err| {
            error!("failed to read config: {err}");
            std::process::exit(1);
        })
}
