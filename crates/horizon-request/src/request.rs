//! Request building and the per-method entry points.

use http::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::body::RequestBody;
use crate::client::HttpClient;
use crate::config::RequestConfig;
use crate::error::Result;
use crate::query::build_url;
use crate::response::HttpResponse;

const TARGET: &str = "horizon_request::http";

/// HTTP request methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method.
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP DELETE method.
    Delete,
    /// HTTP PATCH method.
    Patch,
    /// HTTP HEAD method.
    Head,
    /// HTTP OPTIONS method.
    Options,
}

impl HttpMethod {
    /// Convert to reqwest method.
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Patch => write!(f, "PATCH"),
            Self::Head => write!(f, "HEAD"),
            Self::Options => write!(f, "OPTIONS"),
        }
    }
}

/// A fully assembled request, ready to be sent.
///
/// Cookies are not visible here: the client's jar attaches them when the
/// request is sent.
#[derive(Debug)]
pub struct HttpRequest {
    client: HttpClient,
    transport: reqwest::Client,
    inner: reqwest::Request,
}

impl HttpRequest {
    /// The request method.
    pub fn method(&self) -> &reqwest::Method {
        self.inner.method()
    }

    /// The final URL, query parameters included.
    pub fn url(&self) -> &url::Url {
        self.inner.url()
    }

    /// The request headers.
    pub fn headers(&self) -> &http::HeaderMap {
        self.inner.headers()
    }

    /// The body bytes, when the body is buffered (form and JSON bodies).
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.inner.body().and_then(|body| body.as_bytes())
    }

    /// The client this request will be sent through.
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Send the request and wait for the response headers.
    pub async fn send(self) -> Result<HttpResponse> {
        tracing::debug!(
            target: TARGET,
            "{} {}",
            self.inner.method(),
            self.inner.url()
        );
        let response = self.transport.execute(self.inner).await?;
        tracing::debug!(target: TARGET, "{} -> {}", response.url(), response.status());
        Ok(HttpResponse::from_reqwest(response))
    }
}

/// Turns a method, a URL and a [`RequestConfig`] into one request.
///
/// Assembly order: body, URL and query, headers (with the body's content-type
/// precedence), cookies, proxy, basic auth.
pub struct RequestBuilder {
    method: HttpMethod,
    url: String,
    config: RequestConfig,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: HttpMethod, url: impl Into<String>, config: RequestConfig) -> Self {
        Self {
            method,
            url: url.into(),
            config,
        }
    }

    /// Assemble the request without sending it.
    ///
    /// File-field readers are drained here. Configured cookies are stored
    /// into the client's jar once the request has been assembled, so a
    /// failed build leaves the jar untouched. An empty proxy URL means no
    /// per-request proxy.
    pub async fn build(self) -> Result<HttpRequest> {
        let config = self.config;

        let body = RequestBody::build(config.data, config.files, config.json).await?;
        let url = build_url(&self.url, &config.params)?;

        let mut headers = http::HeaderMap::with_capacity(config.headers.len());
        for (name, value) in &config.headers {
            headers.insert(
                http::HeaderName::from_bytes(name.as_bytes())?,
                http::HeaderValue::from_str(value)?,
            );
        }
        if body.kind().overrides_content_type() {
            if let Some(dropped) = headers.remove(CONTENT_TYPE) {
                tracing::debug!(
                    target: TARGET,
                    "Replacing caller Content-Type {:?} for {:?} body",
                    dropped,
                    body.kind()
                );
            }
        }

        if config.basic_auth.is_set() && headers.remove(AUTHORIZATION).is_some() {
            tracing::debug!(
                target: TARGET,
                "Replacing caller Authorization with basic credentials"
            );
        }

        let proxy = config.proxy.as_deref().filter(|proxy| !proxy.is_empty());
        let transport = config.client.transport(proxy)?;

        let mut builder = transport
            .request(self.method.to_reqwest(), url.clone())
            .headers(headers.clone());
        builder = body.apply(builder, &headers);

        if config.basic_auth.is_set() {
            builder = builder.basic_auth(
                &config.basic_auth.username,
                Some(&config.basic_auth.password),
            );
        }
        let inner = builder.build()?;

        for (name, value) in &config.cookies {
            config.client.jar().add_cookie(name.clone(), value.clone(), &url);
        }

        Ok(HttpRequest {
            client: config.client,
            transport,
            inner,
        })
    }

    /// Build and send the request.
    pub async fn send(self) -> Result<HttpResponse> {
        self.build().await?.send().await
    }
}

/// Issue a request with an arbitrary method.
///
/// Drop the returned response (or read its body) to release the connection.
pub async fn request(
    method: HttpMethod,
    url: impl AsRef<str>,
    config: RequestConfig,
) -> Result<HttpResponse> {
    RequestBuilder::new(method, url.as_ref(), config).send().await
}

/// Issue a GET to `url`.
pub async fn get(url: impl AsRef<str>, config: RequestConfig) -> Result<HttpResponse> {
    request(HttpMethod::Get, url, config).await
}

/// Issue a HEAD to `url`.
pub async fn head(url: impl AsRef<str>, config: RequestConfig) -> Result<HttpResponse> {
    request(HttpMethod::Head, url, config).await
}

/// Issue a POST to `url`.
pub async fn post(url: impl AsRef<str>, config: RequestConfig) -> Result<HttpResponse> {
    request(HttpMethod::Post, url, config).await
}

/// Issue a PUT to `url`.
pub async fn put(url: impl AsRef<str>, config: RequestConfig) -> Result<HttpResponse> {
    request(HttpMethod::Put, url, config).await
}

/// Issue a PATCH to `url`.
pub async fn patch(url: impl AsRef<str>, config: RequestConfig) -> Result<HttpResponse> {
    request(HttpMethod::Patch, url, config).await
}

/// Issue a DELETE to `url`.
pub async fn delete(url: impl AsRef<str>, config: RequestConfig) -> Result<HttpResponse> {
    request(HttpMethod::Delete, url, config).await
}

/// Issue an OPTIONS to `url`.
pub async fn options(url: impl AsRef<str>, config: RequestConfig) -> Result<HttpResponse> {
    request(HttpMethod::Options, url, config).await
}
