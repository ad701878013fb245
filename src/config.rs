use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the master, experience and public snapshots
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Google Maps API key. Without it, distance scoring is disabled.
    #[serde(default)]
    pub google_maps_api_key: Option<String>,

    /// Google Geocoding API base URL
    #[serde(default = "default_geocode_api_url")]
    pub geocode_api_url: String,

    /// Upper bound on the per-query geocode call
    #[serde(default = "default_geocode_timeout_ms")]
    pub geocode_timeout_ms: u64,

    /// Redis connection URL for the geocode cache
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Number of results returned per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Maximum want-to-try entries among the returned results
    #[serde(default = "default_max_want_to_try")]
    pub max_want_to_try: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_geocode_api_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_geocode_timeout_ms() -> u64 {
    1500
}

fn default_top_k() -> usize {
    6
}

fn default_max_want_to_try() -> usize {
    1
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_millis(self.geocode_timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
