//! HTTP cache control module
//!
//! Provides `ETag` generation, conditional request handling and the
//! `Cache-Control` decision shared by every content endpoint.

use sha2::{Digest, Sha256};

/// Default max-age for content addressed by a unique (immutable) reference: one week
pub const STATIC_CACHE_MAX_AGE: u64 = 60 * 60 * 24 * 7;

/// Generate a strong `ETag` from the full content
///
/// # Returns
/// Quoted hex digest, e.g. `"9f86d0..."`
pub fn generate_etag(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    format!("\"{}\"", hex::encode(digest))
}

/// Check if the client's `If-None-Match` header matches the server's `ETag`
///
/// The comparison is an exact string match: lists and the `*` wildcard are
/// treated as a miss and the client gets a full response.
///
/// # Returns
/// Returns true if matched (should return 304), false otherwise
pub fn should_return_not_modified(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| client_etag == etag)
}

/// Cache policy of a content response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Unique reference: the bytes behind it never change
    Immutable(u64),
    /// Mutable reference: clients must revalidate every time
    Revalidate,
}

impl CachePolicy {
    /// Pick the policy for a reference
    pub const fn for_reference(is_unique: bool, static_max_age: u64) -> Self {
        if is_unique {
            Self::Immutable(static_max_age)
        } else {
            Self::Revalidate
        }
    }

    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Immutable(max_age) => format!("max-age={max_age}"),
            Self::Revalidate => "max-age=0".to_string(),
        }
    }
}

/// `Cache-Control` value for a reference
pub fn cache_control_value(is_unique: bool, static_max_age: u64) -> String {
    CachePolicy::for_reference(is_unique, static_max_age).to_header_value()
}
