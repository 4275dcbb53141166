use std::time::Duration;

use async_trait::async_trait;

use super::client::HttpClient;

pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// A plain client with request and connect timeouts, so a stalled feed
    /// fails the round instead of hanging a scheduled run.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("BasicClient: reqwest client construction");
        Self(client)
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
