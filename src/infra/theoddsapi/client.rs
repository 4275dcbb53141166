use anyhow::Result;
use async_trait::async_trait;

use odds_poller::fetch::{HttpClient, fetch_json};
use odds_poller::model::{Event, Sport};

use crate::services::odds_api::OddsApi;

/// The Odds API v4 client, generic over the HTTP client so the `apiKey`
/// query parameter is injected by a [`UrlParam`] wrapper rather than
/// spelled into every URL here.
///
/// [`UrlParam`]: odds_poller::fetch::auth::UrlParam
pub struct TheOddsApiClient<C> {
    base_url: String,
    http: C,
}

impl<C: HttpClient> TheOddsApiClient<C> {
    pub fn new(http: C) -> Self {
        Self {
            base_url: "https://api.the-odds-api.com".to_string(),
            http,
        }
    }
}

#[async_trait]
impl<C: HttpClient> OddsApi for TheOddsApiClient<C> {
    async fn list_sports(&self) -> Result<Vec<Sport>> {
        let url = format!("{}/v4/sports/", self.base_url);
        fetch_json(&self.http, &url).await
    }

    async fn fetch_odds(&self, sport: &str, region: &str, markets: &str) -> Result<Vec<Event>> {
        let url = format!(
            "{}/v4/sports/{}/odds?regions={}&markets={}&oddsFormat=american",
            self.base_url, sport, region, markets
        );
        fetch_json(&self.http, &url).await
    }
}
