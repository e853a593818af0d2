//! Per-call request configuration.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncRead;

use crate::client::HttpClient;
use crate::error::Result;

/// The `User-Agent` every [`RequestConfig`] starts with.
pub fn default_user_agent() -> String {
    format!("horizon-request/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP Basic credentials. An empty username means "not set".
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BasicAuth {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl BasicAuth {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Whether credentials should be attached.
    pub fn is_set(&self) -> bool {
        !self.username.is_empty()
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One file part of a multipart upload.
///
/// The reader is drained exactly once, when the request body is built.
pub struct FileField {
    /// Form field name.
    pub field_name: String,
    /// File name reported in the part's `Content-Disposition`.
    pub file_name: String,
    /// MIME type of the part; `application/octet-stream` when unset.
    pub mime_type: Option<String>,
    pub(crate) reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl FileField {
    /// Create a file field backed by any async reader.
    pub fn from_reader(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        reader: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            mime_type: None,
            reader: Box::new(reader),
        }
    }

    /// Create a file field from in-memory bytes.
    pub fn from_bytes(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self::from_reader(field_name, file_name, std::io::Cursor::new(bytes.into()))
    }

    /// Open a file on disk. The part's file name is the path's final component.
    pub async fn open(field_name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_reader(field_name, file_name, file))
    }

    /// Set the part's MIME type.
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl fmt::Debug for FileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileField")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// Everything that shapes one request: headers, cookies, query parameters,
/// the body source, proxy and credentials, plus the client that sends it.
///
/// The body is chosen by precedence: `files` over `json` over `data`.
///
/// # Example
///
/// ```ignore
/// use horizon_request::{HttpClient, RequestConfig};
///
/// let client = HttpClient::new();
/// let config = RequestConfig::new(&client)
///     .param("page", "2")
///     .header("Accept", "application/json")
///     .basic_auth("user", "secret");
/// let mut response = horizon_request::get("https://httpbin.org/get", config).await?;
/// println!("{}", response.text().await?);
/// ```
#[derive(Debug)]
pub struct RequestConfig {
    /// Client that executes the request.
    pub client: HttpClient,
    /// Request headers. Seeded with a default `User-Agent`.
    pub headers: HashMap<String, String>,
    /// Cookies stored into the client's jar for the request URL before sending.
    pub cookies: HashMap<String, String>,
    /// Query parameters appended to the URL.
    pub params: BTreeMap<String, String>,
    /// Form fields; also sent as text parts when `files` is non-empty.
    pub data: Option<BTreeMap<String, String>>,
    /// File parts for a multipart body.
    pub files: Vec<FileField>,
    /// Arbitrary JSON payload.
    pub json: Option<serde_json::Value>,
    /// Proxy URL for this request only.
    pub proxy: Option<String>,
    /// Basic credentials.
    pub basic_auth: BasicAuth,
}

impl RequestConfig {
    /// Create a configuration bound to `client`.
    pub fn new(client: &HttpClient) -> Self {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), default_user_agent());
        Self {
            client: client.clone(),
            headers,
            cookies: HashMap::new(),
            params: BTreeMap::new(),
            data: None,
            files: Vec::new(),
            json: None,
            proxy: None,
            basic_auth: BasicAuth::default(),
        }
    }

    /// Set a header, replacing any earlier value for the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    /// Add a cookie.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Add a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a form field.
    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add a file part.
    pub fn file(mut self, file: FileField) -> Self {
        self.files.push(file);
        self
    }

    /// Set the JSON payload.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.json = Some(value);
        self
    }

    /// Serialize `value` into the JSON payload.
    pub fn json_from<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.json = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    /// Route this request through `proxy_url`.
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy = Some(proxy_url.into());
        self
    }

    /// Attach HTTP Basic credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = BasicAuth::new(username, password);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use tokio::io::AsyncReadExt;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(
            &self,
            _serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn test_new_config_defaults() {
        let client = HttpClient::new();
        let config = RequestConfig::new(&client);

        assert_eq!(config.headers.get("User-Agent"), Some(&default_user_agent()));
        assert!(config.cookies.is_empty());
        assert!(config.params.is_empty());
        assert!(config.data.is_none());
        assert!(config.files.is_empty());
        assert!(config.json.is_none());
        assert!(config.proxy.is_none());
        assert!(!config.basic_auth.is_set());
    }

    #[test]
    fn test_header_replaces_case_insensitively() {
        let client = HttpClient::new();
        let config = RequestConfig::new(&client).header("user-agent", "custom/1.0");

        assert_eq!(config.headers.len(), 1);
        assert_eq!(config.headers.get("user-agent").map(String::as_str), Some("custom/1.0"));
    }

    #[test]
    fn test_builder_setters() {
        let client = HttpClient::new();
        let config = RequestConfig::new(&client)
            .cookie("session", "abc")
            .param("page", "1")
            .data("name", "lattice")
            .json(serde_json::json!({"k": [1, 2, {"deep": null}]}))
            .proxy("http://proxy.local:3128")
            .basic_auth("u", "p");

        assert_eq!(config.cookies["session"], "abc");
        assert_eq!(config.params["page"], "1");
        assert_eq!(config.data.as_ref().unwrap()["name"], "lattice");
        assert_eq!(config.json.as_ref().unwrap()["k"][2]["deep"], serde_json::Value::Null);
        assert_eq!(config.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert_eq!(config.basic_auth, BasicAuth::new("u", "p"));
    }

    #[test]
    fn test_json_from_serialization_failure() {
        let client = HttpClient::new();
        let result = RequestConfig::new(&client).json_from(&Unserializable);
        assert!(matches!(result, Err(crate::error::RequestError::Json(_))));
    }

    #[test]
    fn test_basic_auth_debug_redacts_password() {
        let auth = BasicAuth::new("user", "hunter2");
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_file_field_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, b"a,b\n1,2\n").unwrap();

        let mut field = FileField::open("upload", &path).await.unwrap();
        assert_eq!(field.field_name, "upload");
        assert_eq!(field.file_name, "report.csv");

        let mut contents = Vec::new();
        field.reader.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_file_field_open_missing() {
        let result = FileField::open("upload", "/definitely/not/here.bin").await;
        assert!(matches!(result, Err(crate::error::RequestError::Io(_))));
    }
}
