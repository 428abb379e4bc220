//! Request parameters of the content endpoints
//!
//! Path segments and query string arguments collapse into one `RouteParams`;
//! values taken from the path win over query arguments of the same name.

use crate::resolver::{ContentQuery, ContentRef, ATTACHMENT_MODEL};

/// Parameters understood by `/web/content` and `/web/image`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub xmlid: Option<String>,
    pub model: Option<String>,
    pub id: Option<u64>,
    pub field: Option<String>,
    /// Cache-busting token; its presence marks the reference immutable
    pub unique: Option<String>,
    pub filename: Option<String>,
    pub filename_field: Option<String>,
    pub mimetype: Option<String>,
    pub download: bool,
    /// Echoed back as the `fileToken` cookie
    pub token: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl RouteParams {
    /// Fill unset parameters from a query string
    pub fn apply_query(&mut self, query: &str) {
        for (key, value) in parse_query(query) {
            match key.as_str() {
                "xmlid" => set_if_none(&mut self.xmlid, value),
                "model" => set_if_none(&mut self.model, value),
                "id" => {
                    if self.id.is_none() {
                        self.id = value.parse().ok();
                    }
                }
                "field" => set_if_none(&mut self.field, value),
                "unique" => set_if_none(&mut self.unique, value),
                "filename" => set_if_none(&mut self.filename, value),
                "filename_field" => set_if_none(&mut self.filename_field, value),
                "mimetype" => set_if_none(&mut self.mimetype, value),
                "download" => self.download = self.download || is_truthy(&value),
                "token" => set_if_none(&mut self.token, value),
                "width" => {
                    if self.width == 0 {
                        self.width = value.parse().unwrap_or(0);
                    }
                }
                "height" => {
                    if self.height == 0 {
                        self.height = value.parse().unwrap_or(0);
                    }
                }
                _ => {}
            }
        }
    }

    /// Whether the reference names an immutable version of the content
    pub fn is_unique(&self) -> bool {
        self.unique.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// The record this request points at, if any
    pub fn reference(&self) -> Option<ContentRef> {
        if let Some(xmlid) = self.xmlid.as_ref().filter(|x| !x.is_empty()) {
            return Some(ContentRef::Xmlid(xmlid.clone()));
        }
        self.id.map(|id| ContentRef::Record {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| ATTACHMENT_MODEL.to_string()),
            id,
        })
    }

    /// Build the resolver query for an endpoint with `default_mimetype`
    pub fn to_query(&self, default_mimetype: &str) -> ContentQuery {
        let mut query = ContentQuery::new(self.reference(), default_mimetype);
        if let Some(field) = self.field.as_ref().filter(|f| !f.is_empty()) {
            query.field.clone_from(field);
        }
        if let Some(filename_field) = self.filename_field.as_ref().filter(|f| !f.is_empty()) {
            query.filename_field.clone_from(filename_field);
        }
        query.filename.clone_from(&self.filename);
        query.mimetype.clone_from(&self.mimetype);
        query
    }
}

fn set_if_none(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Query flags are set by any value except an empty one, `0` or `false`
pub fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false"
    )
}

/// Split and percent-decode a query string
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Percent-decode one URL component (`+` means space in query strings)
pub fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw).map_or(raw.clone(), std::borrow::Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let pairs = parse_query("download=true&filename=my+clip%20%C3%A4.mp4&&flag");
        assert_eq!(
            pairs,
            vec![
                ("download".to_string(), "true".to_string()),
                ("filename".to_string(), "my clip ä.mp4".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_apply_query_keeps_path_values() {
        let mut params = RouteParams {
            id: Some(7),
            filename: Some("path.mp4".to_string()),
            ..RouteParams::default()
        };
        params.apply_query("id=9&filename=query.mp4&model=product.template&download=1&width=120");
        assert_eq!(params.id, Some(7));
        assert_eq!(params.filename.as_deref(), Some("path.mp4"));
        assert_eq!(params.model.as_deref(), Some("product.template"));
        assert!(params.download);
        assert_eq!(params.width, 120);
    }

    #[test]
    fn test_truthy_flags() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("yes"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("False"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn test_reference_precedence() {
        let params = RouteParams {
            xmlid: Some("website.logo".to_string()),
            id: Some(3),
            ..RouteParams::default()
        };
        assert_eq!(
            params.reference(),
            Some(ContentRef::Xmlid("website.logo".to_string()))
        );

        let params = RouteParams {
            id: Some(3),
            ..RouteParams::default()
        };
        assert_eq!(params.reference(), Some(ContentRef::attachment(3)));
        assert_eq!(RouteParams::default().reference(), None);
    }

    #[test]
    fn test_to_query() {
        let params = RouteParams {
            model: Some("product.template".to_string()),
            id: Some(4),
            field: Some("video".to_string()),
            filename: Some("bike.mp4".to_string()),
            unique: Some("abc".to_string()),
            ..RouteParams::default()
        };
        let query = params.to_query("image/png");
        assert_eq!(query.field, "video");
        assert_eq!(query.filename_field, "datas_fname");
        assert_eq!(query.filename.as_deref(), Some("bike.mp4"));
        assert_eq!(query.default_mimetype, "image/png");
        assert!(params.is_unique());
        assert!(!RouteParams::default().is_unique());
    }
}
