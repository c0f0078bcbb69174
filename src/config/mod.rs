use std::env;
use std::time::Duration;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_BASE_URI must be a non-root path starting with '/', got {0:?}")]
    InvalidBaseUri(String),
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub cors_origins: Vec<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub agent_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".into(),
            server_port: 8000,
            api_base_uri: "/api/v1".into(),
            database_url: None,
            database_max_connections: 10,
            cors_origins: vec![
                "http://localhost:3000".into(),
                "http://localhost:3001".into(),
            ],
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".into(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.into(),
            agent_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Numeric values
    /// that fail to parse fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_uri = non_empty("API_BASE_URI").unwrap_or(defaults.api_base_uri);
        if !api_base_uri.starts_with('/') || api_base_uri.trim_end_matches('/').is_empty() {
            return Err(ConfigError::InvalidBaseUri(api_base_uri));
        }

        let cors_origins = non_empty("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        Ok(Config {
            server_host: non_empty("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: non_empty("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            api_base_uri: api_base_uri.trim_end_matches('/').to_string(),
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: non_empty("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.database_max_connections),
            cors_origins,
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: non_empty("GEMINI_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_base_url),
            agent_timeout_secs: non_empty("AGENT_TIMEOUT_SECS")
                .and_then(|v| v.trim_end_matches('s').parse().ok())
                .unwrap_or(defaults.agent_timeout_secs),
        })
    }

    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }
}
