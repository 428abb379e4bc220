//! HTTP protocol layer module
//!
//! Range parsing, cache validation, mimetype detection and the response
//! engine that ties them together. Decoupled from routing and storage so the
//! content and image endpoints share identical semantics.

pub mod cache;
pub mod engine;
pub mod envelope;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use engine::{respond, RequestHeaders, ServeOptions};
pub use envelope::{Body, ResponseEnvelope};
pub use range::{parse_range_header, ByteRange};
pub use response::{
    build_405_response, build_500_response, build_envelope_response, build_options_response,
};
