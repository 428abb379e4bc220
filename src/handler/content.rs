//! `/web/content` endpoint
//!
//! Serves any binary field as is. Partial requests go through the range
//! engine unchanged.

use crate::config::AppState;
use crate::error::ResolveError;
use crate::http::{self, mime, RequestHeaders, ResponseEnvelope};
use crate::routing::RouteParams;
use hyper::StatusCode;

/// Mimetype of content nothing else identifies
pub const DEFAULT_MIMETYPE: &str = mime::OCTET_STREAM;

/// Name of the cookie echoing the `token` query parameter
pub const FILE_TOKEN_COOKIE: &str = "fileToken";

/// Resolve and answer a content request
pub fn serve(
    state: &AppState,
    params: &RouteParams,
    request: &RequestHeaders<'_>,
) -> Result<ResponseEnvelope, ResolveError> {
    let query = params.to_query(DEFAULT_MIMETYPE);
    let resolution = state.resolver.resolve(&query)?;

    let options = state.settings.options(params.download, params.is_unique());
    let mut envelope = http::respond(resolution, request, &options);

    if let Some(token) = params.token.as_deref().filter(|t| !t.is_empty()) {
        attach_file_token(&mut envelope, token);
    }

    Ok(envelope)
}

/// Echo the download token so the page that asked for it can notice completion
pub fn attach_file_token(envelope: &mut ResponseEnvelope, token: &str) {
    if envelope.status == StatusCode::MOVED_PERMANENTLY {
        return;
    }
    envelope.push_header(
        "Set-Cookie",
        format!("{FILE_TOKEN_COOKIE}={}; Path=/", urlencoding::encode(token)),
    );
}
