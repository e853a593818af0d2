//! Sending requests through an HTTP proxy.
//!
//! ```text
//! cargo run -p horizon-request --example proxy -- http://127.0.0.1:3128
//! ```

use horizon_request::{HttpClient, RequestConfig};

#[tokio::main]
async fn main() -> horizon_request::Result<()> {
    let proxy_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:3128".to_string());

    // Proxy fixed for the whole client.
    let client = HttpClient::builder().proxy(&proxy_url).build()?;
    let config = RequestConfig::new(&client);
    let mut response = horizon_request::get("http://httpbin.org/get", config).await?;
    println!("client proxy: {} {}", response.status(), response.reason());
    println!("{}", response.text().await?);

    // Proxy for a single request; the client's own transport is untouched.
    let client = HttpClient::new();
    let config = RequestConfig::new(&client).proxy(proxy_url);
    let mut response = horizon_request::get("http://httpbin.org/get", config).await?;
    println!("request proxy: {} {}", response.status(), response.reason());
    println!("{}", response.text().await?);

    Ok(())
}
