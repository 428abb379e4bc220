// Configuration module entry point
// Loads layered configuration: defaults, then config file, then environment

mod state;
mod types;

use std::net::SocketAddr;

use crate::handler::image::MAX_DIMENSION;
use crate::http::cache::STATIC_CACHE_MAX_AGE;
use crate::http::engine::DEFAULT_STREAMING_CONTENT_TYPE;

// Re-export public types
pub use state::AppState;
pub use types::{Config, ContentConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `BYTERANGE_<SECTION>__<KEY>` environment
    /// variables override it.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("BYTERANGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Parse configuration from TOML text layered over the defaults
    pub fn from_toml_str(text: &str) -> Result<Self, config::ConfigError> {
        with_defaults(config::Config::builder())?
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8069)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.write_timeout", 300)?
        .set_default("content.catalog_path", "catalog.toml")?
        .set_default("content.static_cache_max_age", STATIC_CACHE_MAX_AGE)?
        .set_default("content.streaming_content_type", DEFAULT_STREAMING_CONTENT_TYPE)?
        .set_default("content.max_image_dimension", MAX_DIMENSION)
}
