//! Requests-style HTTP for Horizon applications.
//!
//! This crate is a thin convenience layer over [`reqwest`]: one call per
//! request, configured by a [`RequestConfig`] bag.
//!
//! - **Query parameters** appended to any URL
//! - **Bodies**: URL-encoded form, JSON, or multipart file uploads
//! - **Cookies** persisted per client, scoped with the public-suffix list
//! - **Headers**, **basic auth** and **per-request proxies**
//!
//! Connection pooling, TLS, timeouts and redirects are all reqwest's.
//!
//! # Example
//!
//! ```ignore
//! use horizon_request::{HttpClient, RequestConfig};
//!
//! let client = HttpClient::new();
//!
//! // GET with query parameters
//! let config = RequestConfig::new(&client).param("q", "lattice");
//! let mut response = horizon_request::get("https://httpbin.org/get", config).await?;
//! println!("{} {}", response.status(), response.reason());
//! println!("{}", response.text().await?);
//!
//! // POST a form
//! let config = RequestConfig::new(&client)
//!     .data("username", "john")
//!     .data("password", "secret");
//! horizon_request::post("https://httpbin.org/post", config).await?;
//!
//! // POST JSON
//! let config = RequestConfig::new(&client).json(serde_json::json!({"name": "John"}));
//! horizon_request::post("https://httpbin.org/post", config).await?;
//! ```
//!
//! ## Request Bodies
//!
//! At most one body source is used. File fields win over JSON, JSON wins over
//! form data:
//!
//! ```ignore
//! use horizon_request::FileField;
//!
//! let config = RequestConfig::new(&client)
//!     .file(FileField::open("avatar", "avatar.png").await?.mime_type("image/png"))
//!     .data("name", "John"); // sent as a text part next to the file
//! horizon_request::post("https://httpbin.org/post", config).await?;
//! ```
//!
//! JSON and multipart bodies always send their own `Content-Type`; a form
//! body keeps a caller-supplied one. See [`BodyKind`].
//!
//! ## Cookies
//!
//! Every [`HttpClient`] owns a [`CookieJar`]. Cookies from responses, and
//! cookies set through [`RequestConfig::cookie`], are replayed on later
//! requests through the same client:
//!
//! ```ignore
//! horizon_request::get("https://example.com/login", RequestConfig::new(&client)).await?;
//! // Sends the session cookie set by the login response.
//! horizon_request::get("https://example.com/account", RequestConfig::new(&client)).await?;
//! ```
//!
//! ## Proxies
//!
//! A proxy can be set for the whole client or for a single request:
//!
//! ```ignore
//! let client = HttpClient::builder().proxy("http://proxy.local:3128").build()?;
//!
//! let config = RequestConfig::new(&client).proxy("http://10.0.0.2:8080");
//! ```
//!
//! A per-request proxy never changes the client: the client keeps one extra
//! transport per distinct proxy URL, so concurrent requests through different
//! proxies do not interfere.

mod body;
mod client;
mod config;
mod cookie;
mod error;
mod query;
mod request;
mod response;

pub use body::BodyKind;
pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use config::{BasicAuth, FileField, RequestConfig, default_user_agent};
pub use cookie::CookieJar;
pub use error::{RequestError, Result};
pub use query::build_url;
pub use request::{
    HttpMethod, HttpRequest, RequestBuilder, delete, get, head, options, patch, post, put, request,
};
pub use response::HttpResponse;

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
