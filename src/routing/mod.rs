//! Routing module
//!
//! Maps request paths and query strings onto the content endpoints:
//! - Path grammar of `/web/content` and `/web/image`
//! - Query parameter parsing and merging into `RouteParams`

mod matcher;
mod params;

pub use matcher::{match_route, Endpoint};
pub use params::RouteParams;
