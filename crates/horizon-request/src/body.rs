//! Request body construction and content-type precedence.
//!
//! The body source is chosen by a fixed precedence: file fields, then JSON,
//! then form data. The chosen [`BodyKind`] also decides whether a
//! caller-supplied `Content-Type` survives:
//!
//! | kind        | `Content-Type` sent                                   |
//! |-------------|-------------------------------------------------------|
//! | `Empty`     | caller's header, if any                               |
//! | `Form`      | caller's header, else `application/x-www-form-urlencoded` |
//! | `Json`      | `application/json`                                    |
//! | `Multipart` | `multipart/form-data; boundary=...`                   |

use std::collections::BTreeMap;

use http::header::{CONTENT_TYPE, HeaderMap};
use reqwest::multipart::{Form, Part};
use tokio::io::AsyncReadExt;
use url::form_urlencoded;

use crate::config::FileField;
use crate::error::{RequestError, Result};

/// Media type of JSON bodies.
pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";
/// Media type of URL-encoded form bodies.
pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
/// Media type of file parts without an explicit MIME type.
pub(crate) const OCTET_STREAM: &str = "application/octet-stream";

/// Which encoding a request body uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// No body.
    Empty,
    /// URL-encoded form fields.
    Form,
    /// Serialized JSON payload.
    Json,
    /// Multipart file upload.
    Multipart,
}

impl BodyKind {
    /// Pick the body kind for the configured sources.
    pub fn select(has_data: bool, has_files: bool, has_json: bool) -> Self {
        if has_files {
            Self::Multipart
        } else if has_json {
            Self::Json
        } else if has_data {
            Self::Form
        } else {
            Self::Empty
        }
    }

    /// Whether this kind replaces a caller-supplied `Content-Type`.
    pub fn overrides_content_type(self) -> bool {
        matches!(self, Self::Json | Self::Multipart)
    }
}

/// An encoded request body.
pub(crate) enum RequestBody {
    Empty,
    Form(String),
    Json(Vec<u8>),
    Multipart(Form),
}

impl RequestBody {
    /// Build the body from the configured sources, draining any file readers.
    pub(crate) async fn build(
        data: Option<BTreeMap<String, String>>,
        files: Vec<FileField>,
        json: Option<serde_json::Value>,
    ) -> Result<Self> {
        match BodyKind::select(data.is_some(), !files.is_empty(), json.is_some()) {
            BodyKind::Empty => Ok(Self::Empty),
            BodyKind::Multipart => Ok(Self::Multipart(multipart_form(files, data).await?)),
            BodyKind::Json => {
                let payload = json.unwrap_or_default();
                Ok(Self::Json(serde_json::to_vec(&payload)?))
            }
            BodyKind::Form => {
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(data.iter().flatten())
                    .finish();
                Ok(Self::Form(encoded))
            }
        }
    }

    pub(crate) fn kind(&self) -> BodyKind {
        match self {
            Self::Empty => BodyKind::Empty,
            Self::Form(_) => BodyKind::Form,
            Self::Json(_) => BodyKind::Json,
            Self::Multipart(_) => BodyKind::Multipart,
        }
    }

    /// Apply the body and its content type to a request builder whose headers
    /// are already set.
    pub(crate) fn apply(
        self,
        builder: reqwest::RequestBuilder,
        headers: &HeaderMap,
    ) -> reqwest::RequestBuilder {
        match self {
            Self::Empty => builder,
            Self::Form(encoded) => {
                let builder = if headers.contains_key(CONTENT_TYPE) {
                    builder
                } else {
                    builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                };
                builder.body(encoded)
            }
            Self::Json(bytes) => builder
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(bytes),
            Self::Multipart(form) => builder.multipart(form),
        }
    }
}

async fn multipart_form(
    files: Vec<FileField>,
    data: Option<BTreeMap<String, String>>,
) -> Result<Form> {
    let mut form = Form::new();
    for mut file in files {
        let mut contents = Vec::new();
        file.reader.read_to_end(&mut contents).await?;
        let mime_type = file.mime_type.as_deref().unwrap_or(OCTET_STREAM);
        let part = Part::bytes(contents)
            .file_name(file.file_name)
            .mime_str(mime_type)
            .map_err(|e| {
                RequestError::invalid_header(format!("Invalid MIME type '{mime_type}': {e}"))
            })?;
        form = form.part(file.field_name, part);
    }
    for (key, value) in data.into_iter().flatten() {
        form = form.text(key, value);
    }
    Ok(form)
}
