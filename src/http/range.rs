//! HTTP Range request parsing module
//!
//! Single-range `bytes=first-[last]` parsing for media seeking. Anything
//! outside that grammar is rejected instead of being silently ignored, so the
//! caller can answer 400 rather than streaming the wrong bytes.

use crate::error::ContentError;

/// Parsed Range request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte position (inclusive)
    pub first: u64,
    /// Last byte position (inclusive), None means until end of content
    pub last: Option<u64>,
}

impl ByteRange {
    /// Calculate the actual last position for content of `length` bytes.
    ///
    /// Open-ended ranges and ranges reaching past the end are clamped to
    /// `length - 1`.
    #[inline]
    pub fn last_position(&self, length: u64) -> u64 {
        let end = length.saturating_sub(1);
        self.last.map_or(end, |last| last.min(end))
    }

    /// Whether the range starts inside content of `length` bytes
    #[inline]
    pub const fn is_satisfiable(&self, length: u64) -> bool {
        self.first < length
    }
}

/// Parse HTTP Range header
///
/// Supported format: `bytes=first-last` or `bytes=first-`.
///
/// # Returns
/// * `Ok(None)` - no header, or a blank one
/// * `Ok(Some(range))` - a syntactically valid single range
/// * `Err(ContentError::MalformedRange)` - anything else
///
/// # Examples
/// ```
/// use byterange::http::range::parse_range_header;
///
/// let range = parse_range_header(Some("bytes=0-99")).unwrap().unwrap();
/// assert_eq!((range.first, range.last), (0, Some(99)));
///
/// assert!(parse_range_header(None).unwrap().is_none());
/// assert!(parse_range_header(Some("items=0-99")).is_err());
/// ```
pub fn parse_range_header(range_header: Option<&str>) -> Result<Option<ByteRange>, ContentError> {
    let Some(header) = range_header else {
        return Ok(None);
    };

    if header.trim().is_empty() {
        return Ok(None);
    }

    let malformed = || ContentError::MalformedRange(header.to_string());

    let spec = header.strip_prefix("bytes=").ok_or_else(malformed)?;
    let (first_str, last_str) = spec.split_once('-').ok_or_else(malformed)?;

    // Suffix ranges ("-500") carry no first position
    let first = parse_position(first_str).ok_or_else(malformed)?;

    let last = if last_str.is_empty() {
        None
    } else {
        Some(parse_position(last_str).ok_or_else(malformed)?)
    };

    if let Some(last) = last {
        if last < first {
            return Err(malformed());
        }
    }

    Ok(Some(ByteRange { first, last }))
}

/// Parse a byte position made of ASCII digits only
fn parse_position(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
