use async_trait::async_trait;

use crate::fetch::client::HttpClient;

/// An [`HttpClient`] wrapper that appends an API key as a URL query
/// parameter on every request.
///
/// The Odds API authenticates with `apiKey=<key>`; keeping the credential
/// out of the request URLs built by callers means the key never appears in
/// logs that record those URLs.
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

impl<C> UrlParam<C> {
    /// Convenience constructor for The Odds API's `apiKey` parameter.
    pub fn api_key(inner: C, key: String) -> Self {
        Self {
            inner,
            param_name: "apiKey".to_string(),
            key,
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req).await
    }
}
