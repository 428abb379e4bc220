//! Route matching module
//!
//! Path grammar of the content endpoints:
//!
//! - `/web/content[/<xmlid>|/<id>|/<id>-<unique>][/<filename>]`
//! - `/web/content/<model>/<id>/<field>[/<filename>]`
//! - `/web/image/...` with the same forms plus an optional `<W>x<H>`
//!   segment before the filename

use super::params::{decode_component, RouteParams};

/// Endpoint a request is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Generic content: `/web/content`
    Content,
    /// Images with optional resizing: `/web/image`
    Image,
}

const CONTENT_PREFIX: &str = "/web/content";
const IMAGE_PREFIX: &str = "/web/image";

/// Classified path segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Id(u64),
    IdUnique(u64, String),
    Size(u32, u32),
    Text(String),
}

impl Segment {
    fn classify(raw: &str) -> Self {
        if let Some(id) = parse_int(raw) {
            return Self::Id(id);
        }
        if let Some((w, h)) = raw.split_once('x') {
            if let (Some(w), Some(h)) = (parse_int(w), parse_int(h)) {
                if let (Ok(w), Ok(h)) = (u32::try_from(w), u32::try_from(h)) {
                    return Self::Size(w, h);
                }
            }
        }
        if let Some((id, unique)) = raw.split_once('-') {
            if let Some(id) = parse_int(id) {
                if !unique.is_empty() {
                    return Self::IdUnique(id, unique.to_string());
                }
            }
        }
        Self::Text(raw.to_string())
    }

    fn text(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::IdUnique(id, unique) => format!("{id}-{unique}"),
            Self::Size(w, h) => format!("{w}x{h}"),
            Self::Text(t) => t.clone(),
        }
    }
}

fn parse_int(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Match a request path and query to an endpoint and its parameters
///
/// Returns `None` when the path belongs to no endpoint or does not follow
/// its grammar.
pub fn match_route(path: &str, query: Option<&str>) -> Option<(Endpoint, RouteParams)> {
    let (endpoint, rest) = if let Some(rest) = strip_endpoint(path, CONTENT_PREFIX) {
        (Endpoint::Content, rest)
    } else if let Some(rest) = strip_endpoint(path, IMAGE_PREFIX) {
        (Endpoint::Image, rest)
    } else {
        return None;
    };

    let segments: Vec<Segment> = rest
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| Segment::classify(&decode_component_path(s)))
        .collect();

    let mut params = match endpoint {
        Endpoint::Content => content_params(&segments)?,
        Endpoint::Image => image_params(&segments)?,
    };

    if let Some(query) = query {
        params.apply_query(query);
    }

    Some((endpoint, params))
}

/// Strip an endpoint prefix, requiring a segment boundary after it
fn strip_endpoint<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// Path segments keep `+` literally
fn decode_component_path(raw: &str) -> String {
    if raw.contains('+') {
        raw.split('+')
            .map(decode_component)
            .collect::<Vec<_>>()
            .join("+")
    } else {
        decode_component(raw)
    }
}

/// Apply a leading `<xmlid>`, `<id>` or `<id>-<unique>` segment
fn apply_reference(params: &mut RouteParams, segment: &Segment) {
    match segment {
        Segment::Id(id) => params.id = Some(*id),
        Segment::IdUnique(id, unique) => {
            params.id = Some(*id);
            params.unique = Some(unique.clone());
        }
        other => params.xmlid = Some(other.text()),
    }
}

/// Apply `<model>/<id>/<field>`; the middle segment must be an integer
fn apply_record(params: &mut RouteParams, model: &Segment, id: &Segment, field: &Segment) -> Option<()> {
    let Segment::Id(id) = id else {
        return None;
    };
    params.model = Some(model.text());
    params.id = Some(*id);
    params.field = Some(field.text());
    Some(())
}

fn apply_size(params: &mut RouteParams, segment: &Segment) -> bool {
    if let Segment::Size(w, h) = segment {
        params.width = *w;
        params.height = *h;
        true
    } else {
        false
    }
}

fn content_params(segments: &[Segment]) -> Option<RouteParams> {
    let mut params = RouteParams::default();
    match segments {
        [] => {}
        [reference] => apply_reference(&mut params, reference),
        [reference, filename] => {
            apply_reference(&mut params, reference);
            params.filename = Some(filename.text());
        }
        [model, id, field] => apply_record(&mut params, model, id, field)?,
        [model, id, field, filename] => {
            apply_record(&mut params, model, id, field)?;
            params.filename = Some(filename.text());
        }
        _ => return None,
    }
    Some(params)
}

fn image_params(segments: &[Segment]) -> Option<RouteParams> {
    let mut params = RouteParams::default();
    match segments {
        [] => {}
        [reference] => apply_reference(&mut params, reference),
        [reference, last] => {
            apply_reference(&mut params, reference);
            if !apply_size(&mut params, last) {
                params.filename = Some(last.text());
            }
        }
        [first, Segment::Id(_), field] => apply_record(&mut params, first, &segments[1], field)?,
        [reference, size @ Segment::Size(..), filename] => {
            apply_reference(&mut params, reference);
            apply_size(&mut params, size);
            params.filename = Some(filename.text());
        }
        [model, id, field, last] => {
            apply_record(&mut params, model, id, field)?;
            if !apply_size(&mut params, last) {
                params.filename = Some(last.text());
            }
        }
        [model, id, field, size @ Segment::Size(..), filename] => {
            apply_record(&mut params, model, id, field)?;
            apply_size(&mut params, size);
            params.filename = Some(filename.text());
        }
        _ => return None,
    }
    Some(params)
}
