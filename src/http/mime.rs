//! MIME type detection module
//!
//! Resolves a Content-Type through a fixed fallback chain: explicit values
//! first, then the filename extension, then the content's magic bytes, then
//! the endpoint default.

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const IMAGE_PNG: &str = "image/png";

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use byterange::http::mime::get_content_type;
/// assert_eq!(get_content_type("html"), Some("text/html; charset=utf-8"));
/// assert_eq!(get_content_type("MP4"), Some("video/mp4"));
/// assert_eq!(get_content_type("xyz"), None);
/// ```
pub fn get_content_type(extension: &str) -> Option<&'static str> {
    let content_type = match extension.to_ascii_lowercase().as_str() {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => IMAGE_PNG,
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "bmp" => "image/bmp",

        // Video
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "3gp" => "video/3gpp",

        // Audio
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",
        "doc" => "application/msword",
        "xls" => "application/vnd.ms-excel",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",

        _ => return None,
    };
    Some(content_type)
}

/// Guess Content-Type from a filename's extension
pub fn from_filename(filename: &str) -> Option<&'static str> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(get_content_type)
}

/// Guess Content-Type from the leading bytes of the content
pub fn sniff(content: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", IMAGE_PNG),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b", "application/gzip"),
        (b"\x1a\x45\xdf\xa3", "video/webm"),
        (b"OggS", "audio/ogg"),
        (b"ID3", "audio/mpeg"),
        (b"fLaC", "audio/flac"),
        (b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1", "application/msword"),
    ];

    if let Some(&(_, content_type)) = SIGNATURES
        .iter()
        .find(|(magic, _)| content.starts_with(magic))
    {
        return Some(content_type);
    }

    // RIFF containers: the form type lives at offset 8
    if content.starts_with(b"RIFF") && content.len() >= 12 {
        match &content[8..12] {
            b"WEBP" => return Some("image/webp"),
            b"WAVE" => return Some("audio/wav"),
            b"AVI " => return Some("video/x-msvideo"),
            _ => {}
        }
    }

    // ISO base media: "ftyp" box at offset 4
    if content.len() >= 12 && &content[4..8] == b"ftyp" {
        return match &content[8..12] {
            b"qt  " => Some("video/quicktime"),
            b"M4A " => Some("audio/mp4"),
            b"3gp4" | b"3gp5" | b"3gp6" => Some("video/3gpp"),
            _ => Some("video/mp4"),
        };
    }

    sniff_svg(content)
}

fn sniff_svg(content: &[u8]) -> Option<&'static str> {
    let head = &content[..content.len().min(1024)];
    // The cut may split a multibyte character; keep the valid prefix
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) => std::str::from_utf8(&head[..e.valid_up_to()]).ok()?,
    }
    .trim_start();
    if text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg")) {
        Some("image/svg+xml")
    } else {
        None
    }
}

/// Inputs of the mimetype fallback chain, in priority order
#[derive(Debug, Default, Clone, Copy)]
pub struct MimeHints<'a> {
    /// Mimetype requested by the caller
    pub requested: Option<&'a str>,
    /// Mimetype stored on the record
    pub record: Option<&'a str>,
    /// Filename the content is served under
    pub filename: Option<&'a str>,
    /// Mimetype stored alongside the field's payload
    pub attachment: Option<&'a str>,
}

/// Detect the Content-Type of some content
///
/// Order: requested -> record -> filename extension -> attachment ->
/// content sniffing -> `default`.
pub fn detect_mimetype(hints: MimeHints<'_>, content: &[u8], default: &str) -> String {
    let non_empty = |v: Option<&str>| v.filter(|s| !s.trim().is_empty()).map(ToString::to_string);

    non_empty(hints.requested)
        .or_else(|| non_empty(hints.record))
        .or_else(|| hints.filename.and_then(from_filename).map(ToString::to_string))
        .or_else(|| non_empty(hints.attachment))
        .or_else(|| sniff(content).map(ToString::to_string))
        .unwrap_or_else(|| default.to_string())
}
