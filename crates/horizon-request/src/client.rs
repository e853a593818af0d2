//! HTTP client handle shared by request configurations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::redirect::Policy;

use crate::cookie::CookieJar;
use crate::error::{RequestError, Result};

const TARGET: &str = "horizon_request::http";

/// Configuration for the HTTP client.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Whether to follow redirects.
    pub follow_redirects: bool,
    /// Maximum number of redirects to follow.
    pub max_redirects: usize,
    /// Default user agent.
    pub user_agent: Option<String>,
    /// Proxy URL used by every request that does not name its own.
    pub proxy: Option<String>,
    /// Accept invalid TLS certificates.
    pub danger_accept_invalid_certs: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            follow_redirects: true,
            max_redirects: 10,
            user_agent: None,
            proxy: None,
            danger_accept_invalid_certs: false,
        }
    }
}

/// Builder for creating an HTTP client with custom configuration.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    default_headers: http::HeaderMap,
    jar: Option<Arc<CookieJar>>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            default_headers: http::HeaderMap::new(),
            jar: None,
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Disable redirect following.
    pub fn no_redirects(mut self) -> Self {
        self.config.follow_redirects = false;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Set the user agent string.
    ///
    /// A `User-Agent` in a request's own headers takes precedence.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Route every request through a proxy.
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy_url.into());
        self
    }

    /// Share an existing cookie jar instead of creating a fresh one.
    pub fn cookie_jar(mut self, jar: Arc<CookieJar>) -> Self {
        self.jar = Some(jar);
        self
    }

    /// Accept invalid TLS certificates.
    ///
    /// # Warning
    ///
    /// This is insecure and should only be used for testing.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.config.danger_accept_invalid_certs = true;
        self
    }

    /// Add a default header that will be sent with every request.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Result<Self> {
        let name = name
            .try_into()
            .map_err(|_| RequestError::invalid_header("Invalid header name"))?;
        let value = value
            .try_into()
            .map_err(|_| RequestError::invalid_header("Invalid header value"))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Build the HTTP client.
    pub fn build(self) -> Result<HttpClient> {
        let jar = self.jar.unwrap_or_default();
        let client = build_transport(
            &self.config,
            &self.default_headers,
            &jar,
            self.config.proxy.as_deref(),
        )?;

        Ok(HttpClient {
            inner: Arc::new(HttpClientInner {
                client,
                config: self.config,
                default_headers: self.default_headers,
                jar,
                proxied: Mutex::new(HashMap::new()),
            }),
        })
    }
}

/// Build one reqwest transport. Every transport of a client shares its jar.
fn build_transport(
    config: &HttpClientConfig,
    default_headers: &http::HeaderMap,
    jar: &Arc<CookieJar>,
    proxy: Option<&str>,
) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    if config.follow_redirects {
        builder = builder.redirect(Policy::limited(config.max_redirects));
    } else {
        builder = builder.redirect(Policy::none());
    }

    builder = builder.cookie_provider(Arc::clone(jar));

    if let Some(ref ua) = config.user_agent {
        builder = builder.user_agent(ua);
    }

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|source| RequestError::Proxy {
            url: proxy_url.to_string(),
            source,
        })?;
        builder = builder.proxy(proxy);
    }

    if config.danger_accept_invalid_certs {
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder = builder.default_headers(default_headers.clone());

    Ok(builder.build()?)
}

/// Internal state for the HTTP client.
struct HttpClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
    default_headers: http::HeaderMap,
    jar: Arc<CookieJar>,
    /// Transports derived for per-request proxies, keyed by proxy URL.
    proxied: Mutex<HashMap<String, reqwest::Client>>,
}

/// The HTTP client every request is executed through.
///
/// The client is cheaply cloneable and thread-safe. Clones share the same
/// connection pool, cookie jar and configuration.
///
/// A request that names its own proxy never changes the shared transport:
/// the client derives one extra transport per distinct proxy URL, on first
/// use, with the same settings and cookie jar. Derived transports live as
/// long as the client; call
/// [`clear_proxy_transports`](Self::clear_proxy_transports) when rotating
/// through many proxies.
///
/// # Example
///
/// ```ignore
/// use horizon_request::{HttpClient, RequestConfig};
///
/// let client = HttpClient::builder()
///     .timeout(Duration::from_secs(60))
///     .build()?;
///
/// let config = RequestConfig::new(&client);
/// let response = horizon_request::get("https://httpbin.org/get", config).await?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    pub fn new() -> Self {
        HttpClientBuilder::new()
            .build()
            .expect("Failed to create HTTP client with default configuration")
    }

    /// Create a builder for configuring a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Get the client's configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// The cookie jar shared by every request sent through this client.
    pub fn jar(&self) -> &Arc<CookieJar> {
        &self.inner.jar
    }

    /// The transport for a request, honouring a per-request proxy.
    pub(crate) fn transport(&self, proxy: Option<&str>) -> Result<reqwest::Client> {
        let Some(proxy_url) = proxy else {
            return Ok(self.inner.client.clone());
        };

        let mut proxied = self.inner.proxied.lock();
        if let Some(client) = proxied.get(proxy_url) {
            return Ok(client.clone());
        }

        tracing::debug!(target: TARGET, "Creating transport for proxy {}", proxy_url);
        let client = build_transport(
            &self.inner.config,
            &self.inner.default_headers,
            &self.inner.jar,
            Some(proxy_url),
        )?;
        proxied.insert(proxy_url.to_string(), client.clone());
        Ok(client)
    }

    /// Number of transports derived for per-request proxies.
    pub fn proxy_transport_count(&self) -> usize {
        self.inner.proxied.lock().len()
    }

    /// Drop every transport derived for per-request proxies.
    ///
    /// Requests already built keep their transport; later requests rebuild
    /// one on demand.
    pub fn clear_proxy_transports(&self) {
        let dropped = std::mem::take(&mut *self.inner.proxied.lock()).len();
        tracing::debug!(target: TARGET, "Dropped {} proxy transports", dropped);
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.inner.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let client = HttpClient::new();
        assert_eq!(client.config().timeout, Some(Duration::from_secs(30)));
        assert!(client.config().follow_redirects);
        assert_eq!(client.config().max_redirects, 10);
        assert!(client.jar().is_empty());
    }

    #[test]
    fn test_builder_overrides() {
        let client = HttpClientBuilder::new()
            .timeout(Duration::from_secs(60))
            .no_redirects()
            .max_redirects(3)
            .user_agent("Test/1.0")
            .build()
            .expect("Failed to build client");

        assert_eq!(client.config().timeout, Some(Duration::from_secs(60)));
        assert!(!client.config().follow_redirects);
        assert_eq!(client.config().max_redirects, 3);
        assert_eq!(client.config().user_agent.as_deref(), Some("Test/1.0"));
    }

    #[test]
    fn test_clones_share_jar() {
        let client = HttpClient::new();
        let clone = client.clone();
        assert!(Arc::ptr_eq(client.jar(), clone.jar()));
    }

    #[test]
    fn test_shared_jar_between_clients() {
        let jar = Arc::new(CookieJar::new());
        let a = HttpClient::builder().cookie_jar(Arc::clone(&jar)).build().unwrap();
        let b = HttpClient::builder().cookie_jar(Arc::clone(&jar)).build().unwrap();
        assert!(Arc::ptr_eq(a.jar(), b.jar()));
    }

    #[test]
    fn test_proxy_transports_cached_per_url() {
        let client = HttpClient::new();
        client.transport(None).unwrap();
        assert_eq!(client.proxy_transport_count(), 0);

        client.transport(Some("http://127.0.0.1:3128")).unwrap();
        client.transport(Some("http://127.0.0.1:3128")).unwrap();
        assert_eq!(client.proxy_transport_count(), 1);

        client.transport(Some("http://127.0.0.1:8888")).unwrap();
        assert_eq!(client.proxy_transport_count(), 2);

        client.clear_proxy_transports();
        assert_eq!(client.proxy_transport_count(), 0);
        client.transport(Some("http://127.0.0.1:3128")).unwrap();
        assert_eq!(client.proxy_transport_count(), 1);
    }

    #[test]
    fn test_invalid_proxy_rejected() {
        let client = HttpClient::new();
        let err = client.transport(Some("http://[::1")).unwrap_err();
        assert!(matches!(err, RequestError::Proxy { .. }));
        assert_eq!(client.proxy_transport_count(), 0);

        let err = HttpClient::builder().proxy("http://[::1").build().unwrap_err();
        assert!(matches!(err, RequestError::Proxy { .. }));
    }

    #[test]
    fn test_default_header_rejects_invalid_name() {
        let result = HttpClientBuilder::new().default_header("bad header", "value");
        assert!(matches!(result, Err(RequestError::InvalidHeader(_))));
    }
}
