//! Catalog resolver
//!
//! Content records described in a TOML file:
//!
//! ```toml
//! [[records]]
//! model = "ir.attachment"
//! id = 7
//! xmlid = "website.intro_video"
//!
//! [records.fields]
//! datas = { path = "media/intro.mp4", mimetype = "video/mp4" }
//! datas_fname = "intro.mp4"
//! ```
//!
//! Plain strings are text fields, tables are binary fields backed by a file
//! (relative to the catalog) or an inline base64 payload.

use super::{
    derive_filename, ContentQuery, ContentRef, ContentResolver, Resolution, ResolvedContent,
    ATTACHMENT_MODEL,
};
use crate::error::{CatalogError, ResolveError};
use crate::http::mime::{self, MimeHints};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    records: Vec<CatalogRecord>,
}

/// One record of the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    #[serde(default = "default_model")]
    pub model: String,
    pub id: u64,
    #[serde(default)]
    pub xmlid: Option<String>,
    /// Access flag; unreadable records resolve to `Forbidden`
    #[serde(default = "default_readable")]
    pub readable: bool,
    /// Target of a URL attachment
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,
}

/// Value of a record field
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Binary(BinaryField),
}

/// Binary payload of a record field
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinaryField {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub base64: Option<String>,
    /// Mimetype recorded when the payload was stored
    #[serde(default)]
    pub mimetype: Option<String>,
}

fn default_model() -> String {
    ATTACHMENT_MODEL.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readable() -> bool {
    true
}

impl CatalogRecord {
    fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field)? {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::Binary(_) => None,
        }
    }

    fn is_url_attachment(&self) -> bool {
        self.model == ATTACHMENT_MODEL && self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// Record store loaded from a catalog file
#[derive(Debug, Default)]
pub struct Catalog {
    base_dir: PathBuf,
    records: HashMap<(String, u64), CatalogRecord>,
    xmlids: HashMap<String, (String, u64)>,
}

impl Catalog {
    /// Load a catalog file; relative payload paths resolve against its directory
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_toml_str(&text, base_dir)
    }

    pub fn from_toml_str(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;
        Self::from_records(file.records, base_dir)
    }

    pub fn from_records(
        records: Vec<CatalogRecord>,
        base_dir: impl Into<PathBuf>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            base_dir: base_dir.into(),
            ..Self::default()
        };

        for record in records {
            let key = (record.model.clone(), record.id);
            if let Some(xmlid) = &record.xmlid {
                if catalog.xmlids.insert(xmlid.clone(), key.clone()).is_some() {
                    return Err(CatalogError::DuplicateXmlid(xmlid.clone()));
                }
            }
            if catalog.records.contains_key(&key) {
                return Err(CatalogError::DuplicateRecord {
                    model: key.0,
                    id: key.1,
                });
            }
            catalog.records.insert(key, record);
        }

        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn lookup(&self, reference: &ContentRef) -> Option<&CatalogRecord> {
        match reference {
            ContentRef::Xmlid(xmlid) => self.xmlids.get(xmlid).and_then(|k| self.records.get(k)),
            ContentRef::Record { model, id } => self.records.get(&(model.clone(), *id)),
        }
    }

    /// Materialize the bytes of a field
    fn load_field(
        &self,
        record: &CatalogRecord,
        field: &str,
    ) -> Result<(Bytes, Option<String>, Option<String>), ResolveError> {
        let Some(value) = record.fields.get(field) else {
            return Ok((Bytes::new(), None, None));
        };

        match value {
            FieldValue::Text(text) => Ok((Bytes::from(text.clone().into_bytes()), None, None)),
            FieldValue::Binary(binary) => {
                let attachment_mimetype = binary.mimetype.clone();
                if let Some(path) = &binary.path {
                    let full_path = self.base_dir.join(path);
                    let data = std::fs::read(&full_path).map_err(|source| ResolveError::Io {
                        path: full_path.clone(),
                        source,
                    })?;
                    let modified = std::fs::metadata(&full_path)
                        .and_then(|m| m.modified())
                        .ok()
                        .map(|t| DateTime::<Utc>::from(t).to_rfc3339());
                    Ok((Bytes::from(data), attachment_mimetype, modified))
                } else if let Some(encoded) = &binary.base64 {
                    let data = base64::engine::general_purpose::STANDARD
                        .decode(encoded.trim())
                        .map_err(|source| ResolveError::Decode {
                            reference: format!("{}/{}/{field}", record.model, record.id),
                            source,
                        })?;
                    Ok((Bytes::from(data), attachment_mimetype, None))
                } else {
                    Ok((Bytes::new(), attachment_mimetype, None))
                }
            }
        }
    }
}

impl ContentResolver for Catalog {
    fn exists(&self, reference: &ContentRef, field: &str) -> bool {
        self.lookup(reference)
            .is_some_and(|record| record.fields.contains_key(field) || record.is_url_attachment())
    }

    fn check_access(&self, reference: &ContentRef) -> bool {
        self.lookup(reference).is_some_and(|record| record.readable)
    }

    fn resolve(&self, query: &ContentQuery) -> Result<Resolution, ResolveError> {
        let Some(reference) = &query.reference else {
            return Ok(Resolution::NotFound);
        };

        if !self.exists(reference, &query.field) {
            return Ok(Resolution::NotFound);
        }
        if !self.check_access(reference) {
            return Ok(Resolution::Forbidden);
        }
        let Some(record) = self.lookup(reference) else {
            return Ok(Resolution::NotFound);
        };

        if record.is_url_attachment() {
            if let Some(url) = &record.url {
                return Ok(Resolution::Redirect(url.clone()));
            }
        }

        let (bytes, attachment_mimetype, modified) = self.load_field(record, &query.field)?;

        let filename = derive_filename(
            query.filename.as_deref(),
            record.text(&query.filename_field),
            &record.model,
            record.id,
            &query.field,
        );

        let hints = MimeHints {
            requested: query.mimetype.as_deref(),
            record: record.text("mimetype"),
            filename: Some(&filename),
            attachment: attachment_mimetype.as_deref(),
        };
        let mimetype = mime::detect_mimetype(hints, &bytes, &query.default_mimetype);

        let last_modified = record.last_update.clone().or(modified);

        Ok(Resolution::Content(
            ResolvedContent::new(bytes, mimetype, filename).with_last_modified(last_modified),
        ))
    }
}
