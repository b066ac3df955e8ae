//! Application configuration module
//!
//! Configuration is read from environment variables with the `EDUGEN` prefix.
//! Nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use edugen::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod ai;
mod error;
mod export;
mod server;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use export::ExportConfig;
pub use server::{CorsPolicy, Environment, ServerConfig, DEFAULT_LOG_FILTER};

use secrecy::Secret;
use serde::Deserialize;

/// Unprefixed variable accepted for the Gemini key when the prefixed one is absent.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Root application configuration
///
/// Every section has defaults, so an empty environment still loads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// PDF/Word/slide export configuration
    #[serde(default)]
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `EDUGEN` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Falls back to `GEMINI_API_KEY` for the AI key
    ///
    /// # Environment Variable Format
    ///
    /// - `EDUGEN__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `EDUGEN__AI__MODEL=...` -> `ai.model = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut config: AppConfig = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("EDUGEN")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        if !config.ai.has_api_key() {
            config.ai.gemini_api_key = std::env::var(GEMINI_API_KEY_VAR)
                .ok()
                .filter(|key| !key.is_empty())
                .map(Secret::new);
        }

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.export.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
