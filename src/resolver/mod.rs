//! Content resolver module
//!
//! Maps an abstract content reference (external id, or model + id + field)
//! to raw bytes plus the metadata the response engine needs. Storage and
//! access rules live behind the `ContentResolver` trait; the engine only
//! sees the resulting `Resolution`.

pub mod catalog;

pub use catalog::Catalog;

use crate::error::ResolveError;
use crate::http::cache;
use hyper::body::Bytes;

/// Model holding file attachments
pub const ATTACHMENT_MODEL: &str = "ir.attachment";
/// Binary field of an attachment
pub const DEFAULT_FIELD: &str = "datas";
/// Field holding an attachment's original filename
pub const DEFAULT_FILENAME_FIELD: &str = "datas_fname";

/// Reference to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    /// External identifier, e.g. `website.intro_video`
    Xmlid(String),
    /// Record of `model` with database id `id`
    Record { model: String, id: u64 },
}

impl ContentRef {
    /// Reference to an attachment record
    pub fn attachment(id: u64) -> Self {
        Self::Record {
            model: ATTACHMENT_MODEL.to_string(),
            id,
        }
    }
}

/// Everything a resolver needs to produce content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    /// Record to read from; `None` never resolves
    pub reference: Option<ContentRef>,
    /// Field holding the content
    pub field: String,
    /// Filename chosen by the caller
    pub filename: Option<String>,
    /// Field to read the filename from
    pub filename_field: String,
    /// Mimetype chosen by the caller
    pub mimetype: Option<String>,
    /// Mimetype used when nothing else identifies the content
    pub default_mimetype: String,
}

impl ContentQuery {
    pub fn new(reference: Option<ContentRef>, default_mimetype: &str) -> Self {
        Self {
            reference,
            field: DEFAULT_FIELD.to_string(),
            filename: None,
            filename_field: DEFAULT_FILENAME_FIELD.to_string(),
            mimetype: None,
            default_mimetype: default_mimetype.to_string(),
        }
    }
}

/// Content materialized for a single request
///
/// The bytes and their validator are only set together, through `new` and
/// `with_bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    bytes: Bytes,
    pub mimetype: String,
    pub filename: String,
    validator: String,
    /// Catalog timestamp (`last_update` or file mtime), RFC 3339
    ///
    /// Kept for resolvers and logs; responses never carry `Last-Modified`,
    /// caching goes through the ETag alone.
    pub last_modified: Option<String>,
}

impl ResolvedContent {
    pub fn new(bytes: Bytes, mimetype: impl Into<String>, filename: impl Into<String>) -> Self {
        let validator = cache::generate_etag(&bytes);
        Self {
            bytes,
            mimetype: mimetype.into(),
            filename: filename.into(),
            validator,
            last_modified: None,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Quoted strong validator of the current bytes
    pub fn validator(&self) -> &str {
        &self.validator
    }

    #[must_use]
    pub fn with_last_modified(mut self, last_modified: Option<String>) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Swap the bytes (after post-processing), recomputing the validator
    #[must_use]
    pub fn with_bytes(mut self, bytes: Bytes) -> Self {
        self.validator = cache::generate_etag(&bytes);
        self.bytes = bytes;
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Outcome of resolving a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    Forbidden,
    /// Content lives elsewhere (URL attachment)
    Redirect(String),
    Content(ResolvedContent),
}

/// Source of content for the serving endpoints
///
/// Implementations must be safe to call from many requests at once.
pub trait ContentResolver: Send + Sync {
    /// Whether the referenced record exists and has `field`
    fn exists(&self, reference: &ContentRef, field: &str) -> bool;

    /// Whether the referenced record may be read
    fn check_access(&self, reference: &ContentRef) -> bool;

    /// Resolve a query to content, a redirect, or a refusal
    fn resolve(&self, query: &ContentQuery) -> Result<Resolution, ResolveError>;
}

/// Filename the content is served under
///
/// Order: caller's choice -> the record's filename field -> `<model>-<id>-<field>`.
pub fn derive_filename(
    requested: Option<&str>,
    stored: Option<&str>,
    model: &str,
    id: u64,
    field: &str,
) -> String {
    requested
        .filter(|s| !s.is_empty())
        .or_else(|| stored.filter(|s| !s.is_empty()))
        .map_or_else(|| format!("{model}-{id}-{field}"), ToString::to_string)
}
