//! Range response engine
//!
//! Pure decision logic: given the resolver's outcome and the request's
//! conditional/range headers, compute status, ordered headers and the exact
//! byte slice to emit. Nothing here performs I/O or keeps state between calls.

use crate::error::ContentError;
use crate::http::cache::{self, STATIC_CACHE_MAX_AGE};
use crate::http::envelope::{Body, ResponseEnvelope};
use crate::http::range::{self, ByteRange};
use crate::resolver::{Resolution, ResolvedContent};
use hyper::StatusCode;

/// Media type forced on partial responses for iOS/macOS players
pub const DEFAULT_STREAMING_CONTENT_TYPE: &str = "video/mp4";

/// Request headers the engine consumes
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestHeaders<'a> {
    pub if_none_match: Option<&'a str>,
    pub range: Option<&'a str>,
}

/// Per-endpoint and per-request serving options
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Send the content as an attachment
    pub download: bool,
    /// The reference is unique, so the bytes behind it never change
    pub unique: bool,
    /// Content-Type replacing the resolved mimetype (e.g. after resizing)
    pub content_type_override: Option<String>,
    /// max-age for unique references
    pub static_max_age: u64,
    /// Content-Type of partial responses, `None` keeps the resolved one
    pub streaming_content_type: Option<String>,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            download: false,
            unique: false,
            content_type_override: None,
            static_max_age: STATIC_CACHE_MAX_AGE,
            streaming_content_type: Some(DEFAULT_STREAMING_CONTENT_TYPE.to_string()),
        }
    }
}

/// Compute the response for a resolver outcome
///
/// Not-found and forbidden outcomes come first, then redirects (range
/// headers are never evaluated for them), then content.
pub fn respond(
    resolution: Resolution,
    request: &RequestHeaders<'_>,
    options: &ServeOptions,
) -> ResponseEnvelope {
    let outcome = match resolution {
        Resolution::NotFound => Err(ContentError::NotFound),
        Resolution::Forbidden => Err(ContentError::AccessDenied),
        Resolution::Redirect(target) => return ResponseEnvelope::redirect(target),
        Resolution::Content(content) => serve_content(&content, request, options),
    };

    outcome.unwrap_or_else(|error| ResponseEnvelope::failure(&error))
}

/// Compute the response for resolved content
///
/// A matching `If-None-Match` wins over everything else, including a
/// malformed `Range` header.
pub fn serve_content(
    content: &ResolvedContent,
    request: &RequestHeaders<'_>,
    options: &ServeOptions,
) -> Result<ResponseEnvelope, ContentError> {
    let etag = content.validator();
    let cache_control = cache::cache_control_value(options.unique, options.static_max_age);

    if cache::should_return_not_modified(request.if_none_match, etag) {
        return Ok(ResponseEnvelope::not_modified(etag, cache_control));
    }

    let range = range::parse_range_header(request.range)?;

    let content_type = match (&range, &options.streaming_content_type) {
        (Some(_), Some(streaming)) => streaming.as_str(),
        _ => options
            .content_type_override
            .as_deref()
            .unwrap_or(&content.mimetype),
    };

    let mut headers = vec![
        ("Content-Type", content_type.to_string()),
        ("X-Content-Type-Options", "nosniff".to_string()),
        ("ETag", etag.to_string()),
        ("Cache-Control", cache_control),
    ];

    if options.download {
        headers.push(("Content-Disposition", content_disposition(&content.filename)));
        // Browsers (Safari) otherwise reuse a cached attachment
        headers.push(("Pragma", "no-cache".to_string()));
        headers.push(("Expires", "0".to_string()));
    }

    match range {
        None => {
            headers.push(("Content-Length", content.len().to_string()));
            Ok(ResponseEnvelope {
                status: StatusCode::OK,
                headers,
                body: Body::Content(content.bytes().clone()),
            })
        }
        Some(range) => partial_content(content, range, headers),
    }
}

/// Slice the content for a parsed range and finish the 206 headers
fn partial_content(
    content: &ResolvedContent,
    range: ByteRange,
    mut headers: Vec<(&'static str, String)>,
) -> Result<ResponseEnvelope, ContentError> {
    let length = content.len() as u64;

    if !range.is_satisfiable(length) {
        return Err(ContentError::UnsatisfiableRange {
            first: range.first,
            length,
        });
    }

    let first = range.first;
    let last = range.last_position(length);

    // Both positions are below the in-memory length, so they fit in usize
    let start = to_index(first, content.len());
    let end = to_index(last, content.len());
    let body = content.bytes().slice(start..=end);

    headers.push(("Content-Length", body.len().to_string()));
    headers.push(("Content-Range", format!("bytes {first}-{last}/{length}")));
    headers.push(("Accept-Ranges", "bytes".to_string()));

    Ok(ResponseEnvelope {
        status: StatusCode::PARTIAL_CONTENT,
        headers,
        body: Body::Content(body),
    })
}

fn to_index(position: u64, length: usize) -> usize {
    usize::try_from(position).map_or(length, |p| p.min(length.saturating_sub(1)))
}

/// `Content-Disposition` value for a download
///
/// Carries an ASCII fallback name plus the RFC 5987 UTF-8 form.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Bytes;
    use proptest::prelude::*;

    fn content_of(len: usize) -> ResolvedContent {
        let bytes: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        ResolvedContent::new(Bytes::from(bytes), "application/pdf", "report.pdf")
    }

    fn run(content: &ResolvedContent, if_none_match: Option<&str>, range: Option<&str>) -> ResponseEnvelope {
        let request = RequestHeaders {
            if_none_match,
            range,
        };
        respond(
            Resolution::Content(content.clone()),
            &request,
            &ServeOptions::default(),
        )
    }

    #[test]
    fn test_full_content() {
        let content = content_of(1000);
        let env = run(&content, None, None);
        assert_eq!(env.status, StatusCode::OK);
        assert_eq!(env.header("Content-Type"), Some("application/pdf"));
        assert_eq!(env.header("X-Content-Type-Options"), Some("nosniff"));
        assert_eq!(env.header("ETag"), Some(content.validator()));
        assert_eq!(env.header("Cache-Control"), Some("max-age=0"));
        assert_eq!(env.header("Content-Length"), Some("1000"));
        assert_eq!(env.header("Content-Range"), None);
        assert_eq!(env.header("Accept-Ranges"), None);
        assert_eq!(env.content(), Some(content.bytes()));
    }

    #[test]
    fn test_etag_tracks_replaced_bytes() {
        let content = content_of(1000).with_bytes(Bytes::from_static(b"processed"));
        let env = run(&content, None, None);
        assert_eq!(
            env.header("ETag"),
            Some(cache::generate_etag(b"processed").as_str())
        );
        assert_eq!(env.header("Content-Length"), Some("9"));
    }

    #[test]
    fn test_last_modified_not_emitted() {
        let content =
            content_of(10).with_last_modified(Some("2024-03-01T12:00:00+00:00".to_string()));
        let full = run(&content, None, None);
        let partial = run(&content, None, Some("bytes=0-4"));
        assert_eq!(full.header("Last-Modified"), None);
        assert_eq!(partial.header("Last-Modified"), None);
        assert_eq!(
            full.header_names(),
            vec![
                "Content-Type",
                "X-Content-Type-Options",
                "ETag",
                "Cache-Control",
                "Content-Length"
            ]
        );
    }

    #[test]
    fn test_scenario_open_range() {
        let content = content_of(1000);
        let env = run(&content, None, Some("bytes=500-"));
        assert_eq!(env.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(env.header("Content-Range"), Some("bytes 500-999/1000"));
        assert_eq!(env.header("Content-Length"), Some("500"));
        assert_eq!(env.header("Accept-Ranges"), Some("bytes"));
        assert_eq!(env.content().unwrap().as_ref(), &content.bytes()[500..]);
    }

    #[test]
    fn test_scenario_last_beyond_length() {
        let content = content_of(1000);
        let env = run(&content, None, Some("bytes=0-1999"));
        assert_eq!(env.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(env.header("Content-Range"), Some("bytes 0-999/1000"));
        assert_eq!(env.header("Content-Length"), Some("1000"));
    }

    #[test]
    fn test_scenario_first_beyond_length() {
        let content = content_of(1000);
        let env = run(&content, None, Some("bytes=1000-1005"));
        assert_eq!(env.status, StatusCode::RANGE_NOT_SATISFIABLE);
        assert!(env.headers.is_empty());
        assert_eq!(env.body, Body::Empty);
    }

    #[test]
    fn test_scenario_not_modified() {
        let content = content_of(1000);
        let etag = content.validator().to_string();
        let env = run(&content, Some(&etag), None);
        assert_eq!(env.status, StatusCode::NOT_MODIFIED);
        assert_eq!(env.header_names(), vec!["ETag", "Cache-Control"]);
        assert_eq!(env.body, Body::Empty);
    }

    #[test]
    fn test_not_modified_wins_over_range() {
        let content = content_of(1000);
        let etag = content.validator().to_string();
        assert_eq!(
            run(&content, Some(&etag), Some("bytes=0-9")).status,
            StatusCode::NOT_MODIFIED
        );
        assert_eq!(
            run(&content, Some(&etag), Some("bytes=oops")).status,
            StatusCode::NOT_MODIFIED
        );
    }

    #[test]
    fn test_stale_etag_gets_content() {
        let content = content_of(10);
        let env = run(&content, Some("\"stale\""), None);
        assert_eq!(env.status, StatusCode::OK);
    }

    #[test]
    fn test_scenario_redirect_ignores_range() {
        let request = RequestHeaders {
            if_none_match: None,
            range: Some("bytes=10-5"),
        };
        let env = respond(
            Resolution::Redirect("/website/static/intro.mp4".to_string()),
            &request,
            &ServeOptions::default(),
        );
        assert_eq!(env.status, StatusCode::MOVED_PERMANENTLY);
        assert!(env.headers.is_empty());
        assert_eq!(
            env.body,
            Body::Redirect("/website/static/intro.mp4".to_string())
        );
    }

    #[test]
    fn test_not_found_and_forbidden() {
        let request = RequestHeaders {
            if_none_match: None,
            range: Some("garbage"),
        };
        let env = respond(Resolution::NotFound, &request, &ServeOptions::default());
        assert_eq!(env.status, StatusCode::NOT_FOUND);
        assert!(env.headers.is_empty());

        let env = respond(Resolution::Forbidden, &request, &ServeOptions::default());
        assert_eq!(env.status, StatusCode::FORBIDDEN);
        assert_eq!(env.body, Body::Empty);
    }

    #[test]
    fn test_malformed_range() {
        let content = content_of(100);
        for header in ["bytes=abc-5", "bytes=10-5", "items=0-100"] {
            let env = run(&content, None, Some(header));
            assert_eq!(env.status, StatusCode::BAD_REQUEST, "{header}");
            assert!(env.headers.is_empty());
            assert_eq!(env.body, Body::Empty);
        }
    }

    #[test]
    fn test_partial_header_order_and_streaming_type() {
        let content = content_of(100);
        let env = run(&content, None, Some("bytes=10-19"));
        assert_eq!(
            env.header_names(),
            vec![
                "Content-Type",
                "X-Content-Type-Options",
                "ETag",
                "Cache-Control",
                "Content-Length",
                "Content-Range",
                "Accept-Ranges",
            ]
        );
        assert_eq!(env.header("Content-Type"), Some("video/mp4"));
        assert_eq!(env.content().unwrap().as_ref(), &content.bytes()[10..=19]);
    }

    #[test]
    fn test_streaming_type_can_be_disabled() {
        let content = content_of(100);
        let options = ServeOptions {
            streaming_content_type: None,
            ..ServeOptions::default()
        };
        let request = RequestHeaders {
            if_none_match: None,
            range: Some("bytes=0-"),
        };
        let env = serve_content(&content, &request, &options).unwrap();
        assert_eq!(env.header("Content-Type"), Some("application/pdf"));
    }

    #[test]
    fn test_content_type_override() {
        let content = content_of(100);
        let options = ServeOptions {
            content_type_override: Some("image/png".to_string()),
            ..ServeOptions::default()
        };
        let env = serve_content(&content, &RequestHeaders::default(), &options).unwrap();
        assert_eq!(env.header("Content-Type"), Some("image/png"));
    }

    #[test]
    fn test_unique_and_download_headers() {
        let content = ResolvedContent::new(Bytes::from_static(b"abc"), "video/mp4", "clip ä.mp4");
        let options = ServeOptions {
            download: true,
            unique: true,
            static_max_age: 604_800,
            ..ServeOptions::default()
        };
        let env = serve_content(&content, &RequestHeaders::default(), &options).unwrap();
        assert_eq!(env.header("Cache-Control"), Some("max-age=604800"));
        assert_eq!(
            env.header("Content-Disposition"),
            Some("attachment; filename=\"clip _.mp4\"; filename*=UTF-8''clip%20%C3%A4.mp4")
        );
        assert_eq!(env.header("Pragma"), Some("no-cache"));
        assert_eq!(env.header("Expires"), Some("0"));
        assert_eq!(
            env.header_names(),
            vec![
                "Content-Type",
                "X-Content-Type-Options",
                "ETag",
                "Cache-Control",
                "Content-Disposition",
                "Pragma",
                "Expires",
                "Content-Length",
            ]
        );
    }

    #[test]
    fn test_empty_content() {
        let content = ResolvedContent::new(Bytes::new(), "text/plain", "empty.txt");
        assert_eq!(run(&content, None, None).header("Content-Length"), Some("0"));
        assert_eq!(
            run(&content, None, Some("bytes=0-")).status,
            StatusCode::RANGE_NOT_SATISFIABLE
        );
    }

    #[test]
    fn test_etag_round_trip() {
        let content = content_of(64);
        let first = run(&content, None, None);
        let second = run(&content, None, None);
        let etag = first.header("ETag").unwrap();
        assert_eq!(Some(etag), second.header("ETag"));
        assert_eq!(run(&content, Some(etag), None).status, StatusCode::NOT_MODIFIED);
    }

    proptest! {
        #[test]
        fn prop_valid_range_emits_exact_slice(
            len in 1usize..4096,
            a in any::<prop::sample::Index>(),
            b in any::<prop::sample::Index>(),
        ) {
            let content = content_of(len);
            let (first, last) = {
                let (x, y) = (a.index(len), b.index(len));
                (x.min(y), x.max(y))
            };
            let header = format!("bytes={first}-{last}");
            let env = run(&content, None, Some(&header));

            prop_assert_eq!(env.status, StatusCode::PARTIAL_CONTENT);
            prop_assert_eq!(env.content().unwrap().as_ref(), &content.bytes()[first..=last]);
            let expected_length = (last - first + 1).to_string();
            prop_assert_eq!(env.header("Content-Length"), Some(expected_length.as_str()));
            let expected_range = format!("bytes {first}-{last}/{len}");
            prop_assert_eq!(env.header("Content-Range"), Some(expected_range.as_str()));
        }

        #[test]
        fn prop_start_past_end_is_unsatisfiable(len in 0usize..2048, extra in 0u64..1_000_000) {
            let content = content_of(len);
            let header = format!("bytes={}-", len as u64 + extra);
            let env = run(&content, None, Some(&header));
            prop_assert_eq!(env.status, StatusCode::RANGE_NOT_SATISFIABLE);
            prop_assert_eq!(env.body, Body::Empty);
        }

        #[test]
        fn prop_no_range_never_partial(len in 0usize..2048, send_etag in any::<bool>()) {
            let content = content_of(len);
            let etag = content.validator().to_string();
            let env = run(&content, send_etag.then_some(etag.as_str()), None);
            prop_assert!(env.status == StatusCode::OK || env.status == StatusCode::NOT_MODIFIED);
            prop_assert!(env.header("Content-Range").is_none());
        }

        #[test]
        fn prop_reversed_range_is_bad_request(first in 1u64..1_000_000, gap in 1u64..1000) {
            let content = content_of(16);
            let header = format!("bytes={first}-{}", first.saturating_sub(gap));
            let env = run(&content, None, Some(&header));
            prop_assert_eq!(env.status, StatusCode::BAD_REQUEST);
            prop_assert!(env.content().is_none());
        }
    }
}
