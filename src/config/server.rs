//! Listener, log filter and browser-origin settings for the EduGen server.

use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;

use super::error::ValidationError;

/// `EnvFilter` directive used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,edugen=debug,tower_http=info";

/// Deployment environment. Production switches logs to JSON and closes CORS.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Which browser origins may call the JSON API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin.
    Permissive,
    /// Only the listed origins; empty means same-origin only.
    AllowList(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind, e.g. `0.0.0.0`.
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// Log filter directive.
    pub log_level: String,
    /// Comma-separated origins, e.g. `http://localhost:5173,https://edugen.vn`.
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            log_level: DEFAULT_LOG_FILTER.to_string(),
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ValidationError::InvalidSocketAddr)?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Permissive only outside production and only when no origins are set.
    pub fn cors_policy(&self) -> CorsPolicy {
        let origins: Vec<String> = self
            .cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() && !self.is_production() {
            CorsPolicy::Permissive
        } else {
            CorsPolicy::AllowList(origins)
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr().map(|_| ())
    }
}
