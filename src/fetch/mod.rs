mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Issues a GET to `url` through `client` and deserializes the JSON body.
///
/// Non-2xx responses become errors carrying the status and body so callers
/// can log and skip the round. The Odds API quota headers are logged at
/// debug when present.
pub async fn fetch_json<C: HttpClient, T: DeserializeOwned>(client: &C, url: &str) -> Result<T> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;

    for header in ["x-requests-remaining", "x-requests-used"] {
        if let Some(value) = resp.headers().get(header) {
            debug!(header, value = ?value, "API quota header");
        }
    }

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("API returned status {}: {}", status, body));
    }

    Ok(resp.json().await?)
}
