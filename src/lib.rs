//! HTTP byte-range content server
//!
//! Serves stored binary content over `/web/content` and `/web/image` with
//! single byte-range requests, ETag validation and attachment downloads.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod resolver;
pub mod routing;
pub mod server;
