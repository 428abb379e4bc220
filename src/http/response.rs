//! HTTP response building module
//!
//! Turns engine envelopes into hyper responses and builds the transport-level
//! responses (405, OPTIONS, 500) that never reach the engine.

use crate::http::envelope::{Body, ResponseEnvelope};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Convert an envelope into a hyper response
///
/// Headers are emitted in envelope order. HEAD requests keep status and
/// headers (including `Content-Length`) but carry no body.
pub fn build_envelope_response(envelope: ResponseEnvelope, is_head: bool) -> Response<Full<Bytes>> {
    let status = envelope.status;
    let mut builder = Response::builder().status(status);

    for (name, value) in &envelope.headers {
        builder = builder.header(*name, value.as_str());
    }

    let body = match envelope.body {
        Body::Empty => Bytes::new(),
        Body::Content(bytes) => {
            if is_head {
                Bytes::new()
            } else {
                bytes
            }
        }
        Body::Redirect(target) => {
            builder = builder.header("Location", target);
            Bytes::new()
        }
    };

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        build_500_response()
    })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from("500 Internal Server Error")));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
