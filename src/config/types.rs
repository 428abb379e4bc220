// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub content: ContentConfig,
}

/// Listen address and runtime size
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads; CPU count when unset
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level written: error, warn, info or debug
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Connection handling limits, all durations in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Zero disables HTTP keep-alive
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    /// Long enough for a full download over a slow link
    pub write_timeout: u64,
    /// Connections beyond this are closed on accept
    pub max_connections: Option<u64>,
}

/// Content serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// TOML catalog of servable records
    pub catalog_path: String,
    /// max-age (seconds) for unique references
    pub static_cache_max_age: u64,
    /// Content-Type forced on partial responses; empty keeps the resolved type
    pub streaming_content_type: String,
    /// Upper bound for requested image width/height
    pub max_image_dimension: u32,
    /// PNG served by the image endpoint when a field is empty
    #[serde(default)]
    pub placeholder_path: Option<String>,
}

impl ContentConfig {
    /// Streaming Content-Type, `None` when disabled
    pub fn streaming_content_type(&self) -> Option<String> {
        let value = self.streaming_content_type.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}
