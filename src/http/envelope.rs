//! Response envelope module
//!
//! Transport-neutral description of a response: status, ordered headers and
//! body. Some media players are sensitive to header order, so headers are
//! kept as an ordered list rather than a map.

use crate::error::ContentError;
use hyper::body::Bytes;
use hyper::StatusCode;

/// Response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// No body at all
    Empty,
    /// Bytes to transmit (already sliced for partial responses)
    Content(Bytes),
    /// Redirect target, emitted by the transport as `Location`
    Redirect(String),
}

/// Status, ordered headers and body of one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: Body,
}

impl ResponseEnvelope {
    /// Envelope for a terminal content error: status only, no headers, no body
    pub fn failure(error: &ContentError) -> Self {
        Self {
            status: error.status(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    /// 301 towards `target`, without content headers
    pub const fn redirect(target: String) -> Self {
        Self {
            status: StatusCode::MOVED_PERMANENTLY,
            headers: Vec::new(),
            body: Body::Redirect(target),
        }
    }

    /// 304 carrying only the validator and the cache policy
    pub fn not_modified(etag: &str, cache_control: String) -> Self {
        Self {
            status: StatusCode::NOT_MODIFIED,
            headers: vec![("ETag", etag.to_string()), ("Cache-Control", cache_control)],
            body: Body::Empty,
        }
    }

    /// First value of header `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Append a header after the existing ones
    pub fn push_header(&mut self, name: &'static str, value: impl Into<String>) {
        self.headers.push((name, value.into()));
    }

    /// Content bytes, if the body carries any
    pub const fn content(&self) -> Option<&Bytes> {
        match &self.body {
            Body::Content(bytes) => Some(bytes),
            Body::Empty | Body::Redirect(_) => None,
        }
    }

    /// Header names in emission order
    pub fn header_names(&self) -> Vec<&'static str> {
        self.headers.iter().map(|(n, _)| *n).collect()
    }
}
