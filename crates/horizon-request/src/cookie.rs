//! Cookie storage shared by every request made through one client.
//!
//! [`CookieJar`] plugs into reqwest as its cookie provider, so cookies set by
//! a response are replayed on later requests to a matching domain and path.
//! Cookies whose `Domain` attribute names a public suffix (`co.uk`,
//! `com`, ...) are refused, so one registrable domain can never set
//! cookies for its neighbours.

use cookie_store::RawCookie;
use http::HeaderValue;
use parking_lot::RwLock;
use url::Url;

const TARGET: &str = "horizon_request::cookie";

/// A thread-safe, public-suffix-aware cookie jar.
#[derive(Debug, Default)]
pub struct CookieJar {
    store: RwLock<cookie_store::CookieStore>,
}

impl CookieJar {
    /// Create an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cookie as if `url` had answered with this `Set-Cookie` value.
    ///
    /// Unparseable values and cookies scoped to a public suffix are ignored.
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        match RawCookie::parse(cookie.to_owned()) {
            Ok(raw) => self.store_raw(std::iter::once(raw), url),
            Err(e) => {
                tracing::debug!(target: TARGET, "Ignoring malformed cookie '{}': {}", cookie, e);
            }
        }
    }

    /// Store a host-only `name=value` cookie for `url`.
    pub fn add_cookie(&self, name: impl Into<String>, value: impl Into<String>, url: &Url) {
        let raw = RawCookie::new(name.into(), value.into());
        self.store_raw(std::iter::once(raw), url);
    }

    /// Name/value pairs the jar would send with a request to `url`.
    pub fn cookies_for(&self, url: &Url) -> Vec<(String, String)> {
        self.store
            .read()
            .get_request_values(url)
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect()
    }

    /// Number of unexpired cookies held.
    pub fn len(&self) -> usize {
        self.store.read().iter_unexpired().count()
    }

    /// Whether the jar holds no unexpired cookies.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored cookie.
    pub fn clear(&self) {
        self.store.write().clear();
    }

    fn store_raw(&self, cookies: impl Iterator<Item = RawCookie<'static>>, url: &Url) {
        let admitted: Vec<_> = cookies
            .filter_map(|cookie| scope_to_registrable_domain(cookie, url))
            .collect();
        if admitted.is_empty() {
            return;
        }
        self.store
            .write()
            .store_response_cookies(admitted.into_iter(), url);
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies = cookie_headers.filter_map(|value| {
            let value = value.to_str().ok()?;
            RawCookie::parse(value.to_owned()).ok()
        });
        self.store_raw(cookies, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .cookies_for(url)
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}

/// Apply public-suffix rules to a cookie's `Domain` attribute.
///
/// A cookie naming a public suffix is kept only when the request host is that
/// suffix itself, and then as a host-only cookie.
fn scope_to_registrable_domain(
    mut cookie: RawCookie<'static>,
    url: &Url,
) -> Option<RawCookie<'static>> {
    let Some(domain) = cookie
        .domain()
        .map(|d| d.trim_start_matches('.').to_ascii_lowercase())
    else {
        return Some(cookie);
    };

    if psl::suffix_str(&domain) != Some(domain.as_str()) {
        return Some(cookie);
    }

    match url.host_str() {
        Some(host) if host.eq_ignore_ascii_case(&domain) => {
            cookie.unset_domain();
            Some(cookie)
        }
        _ => {
            tracing::debug!(
                target: TARGET,
                "Rejected cookie '{}' scoped to public suffix '{}'",
                cookie.name(),
                domain
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn set(jar: &CookieJar, header: &str, at: &str) {
        let value = HeaderValue::from_str(header).unwrap();
        jar.set_cookies(&mut std::iter::once(&value), &url(at));
    }

    #[test]
    fn test_host_only_cookie_round_trip() {
        let jar = CookieJar::new();
        set(&jar, "session=abc123; Path=/", "https://example.com/login");

        let header = jar.cookies(&url("https://example.com/account")).unwrap();
        assert_eq!(header.to_str().unwrap(), "session=abc123");
        assert!(jar.cookies(&url("https://sub.example.com/")).is_none());
        assert!(jar.cookies(&url("https://example.org/")).is_none());
    }

    #[test]
    fn test_domain_cookie_matches_subdomains() {
        let jar = CookieJar::new();
        set(&jar, "pref=dark; Domain=example.co.uk; Path=/", "https://www.example.co.uk/");

        assert_eq!(
            jar.cookies_for(&url("https://shop.example.co.uk/cart")),
            vec![("pref".to_string(), "dark".to_string())]
        );
        assert!(jar.cookies_for(&url("https://other.co.uk/")).is_empty());
    }

    #[test]
    fn test_public_suffix_domain_rejected() {
        let jar = CookieJar::new();
        set(&jar, "tracker=1; Domain=co.uk; Path=/", "https://www.example.co.uk/");

        assert!(jar.is_empty());
        assert!(jar.cookies(&url("https://other.co.uk/")).is_none());
        assert!(jar.cookies(&url("https://www.example.co.uk/")).is_none());
    }

    #[test]
    fn test_public_suffix_host_keeps_host_only_cookie() {
        let jar = CookieJar::new();
        set(&jar, "a=1; Domain=co.uk; Path=/", "https://co.uk/");

        assert_eq!(jar.len(), 1);
        assert!(jar.cookies(&url("https://co.uk/")).is_some());
        assert!(jar.cookies(&url("https://example.co.uk/")).is_none());
    }

    #[test]
    fn test_add_cookie_and_clear() {
        let jar = CookieJar::new();
        let target = url("http://127.0.0.1:8080/api");
        jar.add_cookie("token", "xyz", &target);
        jar.add_cookie_str("lang=en; Path=/", &target);

        let mut cookies = jar.cookies_for(&url("http://127.0.0.1:8080/"));
        cookies.sort();
        assert_eq!(
            cookies,
            vec![
                ("lang".to_string(), "en".to_string()),
                ("token".to_string(), "xyz".to_string()),
            ]
        );

        jar.clear();
        assert!(jar.is_empty());
    }
}
