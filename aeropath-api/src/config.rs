use std::collections::HashMap;
use std::env;

use serde::Deserialize;

use aeropath_core::ReliabilityRule;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub live_search: LiveSearchConfig,
    pub data: DataConfig,
    /// Airline-code keyed reliability rules; unknown airlines fall back to
    /// the policy default.
    #[serde(default)]
    pub reliability: HashMap<String, ReliabilityRule>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LiveSearchConfig {
    pub base_url: String,
    /// The loyalty programs the verification backend supports.
    pub supported_programs: Vec<String>,
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: i64,
    #[serde(default = "default_lookup_timeout_seconds")]
    pub lookup_timeout_seconds: u64,
}

fn default_cache_ttl_minutes() -> i64 {
    aeropath_live::DEFAULT_TTL_MINUTES
}

fn default_lookup_timeout_seconds() -> u64 {
    aeropath_live::DEFAULT_LOOKUP_TIMEOUT.as_secs()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub airlines_file: String,
    pub cities_file: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("AEROPATH").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
