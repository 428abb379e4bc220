//! Error types
//!
//! `ContentError` covers the terminal per-request outcomes of content serving.
//! `ResolveError` and `CatalogError` are faults of the content store itself.

use hyper::StatusCode;
use std::path::PathBuf;

/// Terminal outcome of a content request that carries no content.
///
/// None of these are retried: range and cache decisions are deterministic
/// functions of the request and the resolved content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// No such reference, record or field.
    #[error("Content not found")]
    NotFound,

    /// The resolver refused access. The reason is never exposed.
    #[error("Access denied")]
    AccessDenied,

    /// The `Range` header does not follow `bytes=<first>-[<last>]`.
    #[error("Malformed range header: {0:?}")]
    MalformedRange(String),

    /// The range is well formed but starts at or past the end of the content.
    #[error("Range not satisfiable: first byte {first} of {length}")]
    UnsatisfiableRange { first: u64, length: u64 },
}

impl ContentError {
    /// HTTP status code this outcome is surfaced as
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::MalformedRange(_) => StatusCode::BAD_REQUEST,
            Self::UnsatisfiableRange { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }
}

/// Unexpected failure while a resolver materializes content.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Failed to read content from '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid base64 payload in {reference}: {source}")]
    Decode {
        reference: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Resolver task failed: {0}")]
    Task(String),

    #[error("Image processing failed: {0}")]
    Processing(String),
}

/// Failure to load a content catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate record {model}/{id} in catalog")]
    DuplicateRecord { model: String, id: u64 },

    #[error("Duplicate external reference '{0}' in catalog")]
    DuplicateXmlid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ContentError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ContentError::AccessDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ContentError::MalformedRange("bytes=x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ContentError::UnsatisfiableRange {
                first: 10,
                length: 5
            }
            .status(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
    }

    #[test]
    fn test_access_denied_message_is_opaque() {
        assert_eq!(ContentError::AccessDenied.to_string(), "Access denied");
    }
}
