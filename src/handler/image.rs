//! `/web/image` endpoint
//!
//! Like `/web/content` with an image default type, optional resizing and a
//! placeholder for empty fields.

use crate::config::AppState;
use crate::error::ResolveError;
use crate::http::{self, mime, RequestHeaders, ResponseEnvelope, ServeOptions};
use crate::resolver::{ResolvedContent, Resolution};
use crate::routing::RouteParams;

/// Mimetype of images nothing else identifies
pub const DEFAULT_MIMETYPE: &str = mime::IMAGE_PNG;

/// Largest width or height a client may ask for
pub const MAX_DIMENSION: u32 = 500;

/// Resolve and answer an image request
pub fn serve(
    state: &AppState,
    params: &RouteParams,
    request: &RequestHeaders<'_>,
) -> Result<ResponseEnvelope, ResolveError> {
    let query = params.to_query(DEFAULT_MIMETYPE);
    let resolution = state.resolver.resolve(&query)?;

    let mut options = state.settings.options(params.download, params.is_unique());
    let (width, height) = clamp_size(
        params.width,
        params.height,
        state.settings.max_image_dimension,
    );

    let resolution = match resolution {
        // A download link must not reveal whether the record exists
        Resolution::NotFound | Resolution::Forbidden if params.download => Resolution::NotFound,
        Resolution::Content(content) => {
            Resolution::Content(prepare_image(state, content, width, height, &mut options)?)
        }
        other => other,
    };

    Ok(http::respond(resolution, request, &options))
}

/// Clamp the requested size to `limit` on both axes
pub fn clamp_size(width: u32, height: u32, limit: u32) -> (u32, u32) {
    (width.min(limit), height.min(limit))
}

/// Swap in the placeholder or resized bytes, forcing `image/png` when done
fn prepare_image(
    state: &AppState,
    content: ResolvedContent,
    width: u32,
    height: u32,
    options: &mut ServeOptions,
) -> Result<ResolvedContent, ResolveError> {
    if content.is_empty() {
        return Ok(match &state.placeholder {
            Some(placeholder) => {
                options.content_type_override = Some(mime::IMAGE_PNG.to_string());
                content.with_bytes(placeholder.clone())
            }
            None => content,
        });
    }

    if width == 0 && height == 0 {
        return Ok(content);
    }

    match &state.image_processor {
        Some(processor) => {
            let resized = processor.resize(content.bytes(), width, height)?;
            options.content_type_override = Some(mime::IMAGE_PNG.to_string());
            Ok(content.with_bytes(resized))
        }
        None => Ok(content),
    }
}
