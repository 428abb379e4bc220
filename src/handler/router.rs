//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! route matching, dispatching to the endpoints and access logging.

use crate::config::AppState;
use crate::error::{ContentError, ResolveError};
use crate::handler::{content, image};
use crate::http::{self, RequestHeaders, ResponseEnvelope};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{self, Endpoint};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
///
/// Owned so it can move onto the blocking pool with the resolver call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub path: String,
    pub query: Option<String>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub range_header: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            is_head: *req.method() == Method::HEAD,
            if_none_match: header_value(req, "if-none-match"),
            range_header: range_value(req),
        }
    }

    fn headers(&self) -> RequestHeaders<'_> {
        RequestHeaders {
            if_none_match: self.if_none_match.as_deref(),
            range: self.range_header.as_deref(),
        }
    }
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Every `Range` field line, comma-joined and lossily decoded
///
/// Repeated lines form a multi-range and non-ASCII bytes become U+FFFD, so
/// the range parser rejects both instead of the request falling back to 200.
fn range_value<B>(req: &Request<B>) -> Option<String> {
    let lines: Vec<String> = req
        .headers()
        .get_all("range")
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect();
    (!lines.is_empty()).then(|| lines.join(", "))
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);

    let access_entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, &ctx, peer_addr));

    // 1. Check HTTP method
    let response = match check_http_method(req.method()) {
        Some(resp) => resp,
        // 2. Match the endpoint and serve it
        None => route_request(ctx, &state).await,
    };

    // 3. Access log
    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request to its endpoint
///
/// Resolvers may block on storage, so the endpoint runs on the blocking pool.
async fn route_request(ctx: RequestContext, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let is_head = ctx.is_head;

    let Some((endpoint, params)) = routing::match_route(&ctx.path, ctx.query.as_deref()) else {
        logger::log_debug(&format!("No endpoint for {}", ctx.path));
        return http::build_envelope_response(
            ResponseEnvelope::failure(&ContentError::NotFound),
            is_head,
        );
    };

    let path = ctx.path.clone();
    let worker_state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || {
        let headers = ctx.headers();
        match endpoint {
            Endpoint::Content => content::serve(&worker_state, &params, &headers),
            Endpoint::Image => image::serve(&worker_state, &params, &headers),
        }
    })
    .await
    .unwrap_or_else(|e| Err(ResolveError::Task(e.to_string())));

    match result {
        Ok(envelope) => http::build_envelope_response(envelope, is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to serve {path}: {e}"));
            http::build_500_response()
        }
    }
}

/// Access log entry with the request side filled in
fn access_entry<B>(req: &Request<B>, ctx: &RequestContext, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        ctx.path.clone(),
    );
    entry.query.clone_from(&ctx.query);
    entry.http_version = match req.version() {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
    .to_string();
    entry.range.clone_from(&ctx.range_header);
    entry.referer = header_value(req, "referer");
    entry.user_agent = header_value(req, "user-agent");
    entry
}
