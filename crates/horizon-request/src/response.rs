//! HTTP response wrapper.

use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use serde::de::DeserializeOwned;

use crate::error::{RequestError, Result};

/// How far into a body to look for an HTML `<meta charset>` declaration.
const SNIFF_LIMIT: usize = 1024;

/// An HTTP response from a request.
///
/// The body is read at most once: [`content`](Self::content),
/// [`text`](Self::text) and [`json`](Self::json) all work from the same
/// cached buffer. The connection is released once the body has been read or
/// the response is dropped.
pub struct HttpResponse {
    inner: reqwest::Response,
    content: Option<Bytes>,
    text: Option<String>,
}

impl HttpResponse {
    /// Create from a reqwest response.
    pub(crate) fn from_reqwest(response: reqwest::Response) -> Self {
        Self {
            inner: response,
            content: None,
            text: None,
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// The canonical reason phrase for the status code, or `""` if unknown.
    pub fn reason(&self) -> &'static str {
        self.inner.status().canonical_reason().unwrap_or("")
    }

    /// Whether the status code is below 400.
    pub fn ok(&self) -> bool {
        self.status() < 400
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Check if the response is a client error (4xx status).
    pub fn is_client_error(&self) -> bool {
        self.inner.status().is_client_error()
    }

    /// Check if the response is a server error (5xx status).
    pub fn is_server_error(&self) -> bool {
        self.inner.status().is_server_error()
    }

    /// Get the response headers.
    pub fn headers(&self) -> &http::HeaderMap {
        self.inner.headers()
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.inner
            .headers()
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the Content-Type header value.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get the Content-Length header value.
    pub fn content_length(&self) -> Option<u64> {
        self.inner.content_length()
    }

    /// Get the final URL after redirects.
    pub fn url(&self) -> &str {
        self.inner.url().as_str()
    }

    /// The HTTP version of the response.
    pub fn version(&self) -> http::Version {
        self.inner.version()
    }

    /// The full response body. Read from the network on first call only.
    pub async fn content(&mut self) -> Result<&Bytes> {
        let content = match self.content.take() {
            Some(content) => content,
            None => {
                let mut buffer = Vec::new();
                while let Some(chunk) = self.inner.chunk().await? {
                    buffer.extend_from_slice(&chunk);
                }
                Bytes::from(buffer)
            }
        };
        Ok(&*self.content.insert(content))
    }

    /// The response body decoded to text. Decoded on first call only.
    ///
    /// The encoding comes from the `charset` of `Content-Type`, then a byte
    /// order mark, then an HTML `<meta charset>` near the start of the body,
    /// falling back to UTF-8. Malformed sequences become U+FFFD.
    pub async fn text(&mut self) -> Result<&str> {
        let text = match self.text.take() {
            Some(text) => text,
            None => {
                let declared = self.declared_encoding();
                let content = self.content().await?;
                let encoding = declared
                    .or_else(|| sniff_encoding(content))
                    .unwrap_or(UTF_8);
                let (text, _, _) = encoding.decode(content);
                text.into_owned()
            }
        };
        Ok(self.text.insert(text).as_str())
    }

    /// Parse the response body as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T> {
        let content = self.content().await?;
        Ok(serde_json::from_slice(content)?)
    }

    /// Check if the status code indicates success, returning an error if not.
    pub fn error_for_status(self) -> Result<Self> {
        let status = self.status();
        if self.is_success() {
            Ok(self)
        } else {
            Err(RequestError::HttpStatus {
                status,
                message: self.text,
            })
        }
    }

    /// Unwrap the underlying reqwest response.
    ///
    /// Any body already read into the cache is lost.
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }

    fn declared_encoding(&self) -> Option<&'static Encoding> {
        self.content_type()
            .and_then(|value| value.parse::<mime::Mime>().ok())
            .and_then(|media| {
                media
                    .get_param(mime::CHARSET)
                    .and_then(|charset| Encoding::for_label(charset.as_str().as_bytes()))
            })
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status())
            .field("url", &self.url())
            .finish()
    }
}

/// Detect an encoding from a byte order mark or an HTML charset declaration.
fn sniff_encoding(content: &[u8]) -> Option<&'static Encoding> {
    if let Some((encoding, _)) = Encoding::for_bom(content) {
        return Some(encoding);
    }

    let head = &content[..content.len().min(SNIFF_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let meta = head.find("<meta")?;
    let start = head[meta..].find("charset=")? + meta + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    Encoding::for_label(label.as_bytes())
}
