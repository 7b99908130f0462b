use thiserror::Error;

use crate::core::constants::{DEFAULT_LANG, GEOCODE_URL, SEARCH_URL, STATIC_MAP_URL};

const STATIC_APIKEY_VAR: &str = "STATIC_APIKEY";
const SEARCH_APIKEY_VAR: &str = "SEARCH_APIKEY";
const GEOCODE_APIKEY_VAR: &str = "GEOCODE_APIKEY";

/// Raised when the environment lacks a required credential.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingKey(&'static str),
}

/// Where one service lives and the opaque credential sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEndpoint {
    pub base_url: String,
    pub api_key: String,
}

impl ServiceEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

/// Endpoints and credentials for the three backing services.
///
/// API keys are carried opaquely into request building; the engine never
/// validates or parses their format.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub static_map: ServiceEndpoint,
    pub search: ServiceEndpoint,
    pub geocoder: ServiceEndpoint,
    /// Language the search and geocoder services answer in.
    pub lang: String,
}

impl ServiceConfig {
    /// Builds a config with the default endpoints and the given keys.
    pub fn new(
        static_key: impl Into<String>,
        search_key: impl Into<String>,
        geocode_key: impl Into<String>,
    ) -> Self {
        Self {
            static_map: ServiceEndpoint::new(STATIC_MAP_URL, static_key),
            search: ServiceEndpoint::new(SEARCH_URL, search_key),
            geocoder: ServiceEndpoint::new(GEOCODE_URL, geocode_key),
            lang: DEFAULT_LANG.to_string(),
        }
    }

    /// Reads `STATIC_APIKEY`, `SEARCH_APIKEY`, and `GEOCODE_APIKEY` from the
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(
            require_env(STATIC_APIKEY_VAR)?,
            require_env(SEARCH_APIKEY_VAR)?,
            require_env(GEOCODE_APIKEY_VAR)?,
        ))
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingKey(name))
}
