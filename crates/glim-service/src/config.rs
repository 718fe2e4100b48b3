//! Service configuration.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use glim_core::EconomyConfig;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/glim").
    pub data_dir: String,

    /// HS256 secret shared with the auth service.
    pub jwt_secret: Option<String>,

    /// Expected JWT audience (default: "glim-economy").
    pub auth_audience: String,

    /// Expected JWT issuer, if any.
    pub auth_issuer: Option<String>,

    /// Service API key for service-to-service auth.
    pub service_api_key: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Caps, reward ranges and multipliers.
    pub economy: EconomyConfig,
}

/// Auth secrets file structure.
#[derive(Debug, Deserialize)]
struct AuthSecrets {
    jwt_secret: String,
    #[serde(default)]
    service_api_key: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let (jwt_secret, service_api_key) = load_auth_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/glim".into()),
            jwt_secret,
            auth_audience: std::env::var("AUTH_AUDIENCE")
                .unwrap_or_else(|_| "glim-economy".into()),
            auth_issuer: std::env::var("AUTH_ISSUER").ok(),
            service_api_key,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_or("MAX_BODY_BYTES", 64 * 1024),
            request_timeout_seconds: env_or("REQUEST_TIMEOUT_SECONDS", 30),
            economy: economy_from_env(),
        }
    }
}

/// Parse an environment variable, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(name, value = %raw, "Ignoring malformed environment variable");
            default
        }),
        Err(_) => default,
    }
}

/// Economy defaults with environment overrides.
fn economy_from_env() -> EconomyConfig {
    let defaults = EconomyConfig::default();
    EconomyConfig {
        rewarded_daily_cap: env_or("AD_REWARDED_DAILY_CAP", defaults.rewarded_daily_cap),
        rewarded_min_glim: env_or("AD_REWARDED_MIN_GLIM", defaults.rewarded_min_glim),
        rewarded_max_glim: env_or("AD_REWARDED_MAX_GLIM", defaults.rewarded_max_glim),
        daily_glim_cap: env_or("DAILY_GLIM_CAP", defaults.daily_glim_cap),
        day_utc_offset_seconds: env_or("DAY_UTC_OFFSET_SECONDS", defaults.day_utc_offset_seconds),
        ..defaults
    }
}

/// Load auth secrets from file or environment.
fn load_auth_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [".secrets/auth.json", "../.secrets/auth.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<AuthSecrets>(path) {
            tracing::info!(path = %path, "Loaded auth secrets from file");
            return (
                Some(secrets.jwt_secret),
                secrets
                    .service_api_key
                    .or_else(|| std::env::var("SERVICE_API_KEY").ok()),
            );
        }
    }

    // Fall back to environment variables
    tracing::debug!("Auth secrets file not found, using environment variables");
    (
        std::env::var("JWT_SECRET").ok(),
        std::env::var("SERVICE_API_KEY").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/glim".into(),
            jwt_secret: None,
            auth_audience: "glim-economy".into(),
            auth_issuer: None,
            service_api_key: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
            economy: EconomyConfig::default(),
        }
    }
}
