//! Request handler module
//!
//! Request dispatch plus the two content endpoints. Both endpoints resolve
//! through the configured `ContentResolver` and answer through the shared
//! response engine.

pub mod content;
pub mod image;
pub mod router;

// Re-export main entry point
pub use router::handle_request;

use crate::config::ContentConfig;
use crate::error::ResolveError;
use crate::http::ServeOptions;
use hyper::body::Bytes;

/// Serving settings derived from the `content` config section
#[derive(Debug, Clone)]
pub struct ServeSettings {
    pub static_max_age: u64,
    pub streaming_content_type: Option<String>,
    pub max_image_dimension: u32,
}

impl ServeSettings {
    pub fn from_config(config: &ContentConfig) -> Self {
        Self {
            static_max_age: config.static_cache_max_age,
            streaming_content_type: config.streaming_content_type(),
            max_image_dimension: config.max_image_dimension,
        }
    }

    /// Engine options for one request
    pub fn options(&self, download: bool, unique: bool) -> ServeOptions {
        ServeOptions {
            download,
            unique,
            content_type_override: None,
            static_max_age: self.static_max_age,
            streaming_content_type: self.streaming_content_type.clone(),
        }
    }
}

/// Resizes image bytes for `/web/image`
///
/// A zero `width` or `height` keeps the aspect ratio along that axis.
/// The output is PNG encoded.
pub trait ImageProcessor: Send + Sync {
    fn resize(&self, content: &[u8], width: u32, height: u32) -> Result<Bytes, ResolveError>;
}
