// Application state module
// Shared, read-only state handed to every connection

use std::path::Path;
use std::sync::Arc;

use hyper::body::Bytes;

use super::types::Config;
use crate::error::CatalogError;
use crate::handler::{ImageProcessor, ServeSettings};
use crate::resolver::{Catalog, ContentResolver};

/// Application state
pub struct AppState {
    pub config: Config,
    pub resolver: Arc<dyn ContentResolver>,
    /// Resizer for `/web/image`; images are served unscaled without one
    pub image_processor: Option<Arc<dyn ImageProcessor>>,
    /// PNG served by `/web/image` for empty fields
    pub placeholder: Option<Bytes>,
    pub settings: ServeSettings,
}

impl AppState {
    /// Build state around an existing resolver
    pub fn new(config: Config, resolver: Arc<dyn ContentResolver>) -> Self {
        let settings = ServeSettings::from_config(&config.content);
        Self {
            config,
            resolver,
            image_processor: None,
            placeholder: None,
            settings,
        }
    }

    /// Load the catalog and placeholder named by the configuration
    pub fn from_config(config: Config) -> Result<(Self, usize), CatalogError> {
        let catalog = Catalog::load(Path::new(&config.content.catalog_path))?;
        let records = catalog.len();

        let placeholder = match config.content.placeholder_path.as_deref() {
            Some(path) => Some(read_placeholder(path)?),
            None => None,
        };

        let mut state = Self::new(config, Arc::new(catalog));
        state.placeholder = placeholder;
        Ok((state, records))
    }

    #[must_use]
    pub fn with_image_processor(mut self, processor: Arc<dyn ImageProcessor>) -> Self {
        self.image_processor = Some(processor);
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: Bytes) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

fn read_placeholder(path: &str) -> Result<Bytes, CatalogError> {
    std::fs::read(path)
        .map(Bytes::from)
        .map_err(|source| CatalogError::Io {
            path: path.into(),
            source,
        })
}
