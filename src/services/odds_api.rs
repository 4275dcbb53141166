//! Trait boundary for the sports-odds provider.

use anyhow::Result;

use odds_poller::model::{Event, Sport};

/// Abstraction over an odds provider (e.g. The Odds API).
#[async_trait::async_trait]
pub trait OddsApi {
    /// Returns the catalog of available sports.
    async fn list_sports(&self) -> Result<Vec<Sport>>;

    /// Returns current odds for one sport.
    ///
    /// `region` is a comma-separated region list (`us`, `uk`, `eu`, `au`)
    /// and `markets` a comma-separated market list (`h2h,spreads,totals`).
    async fn fetch_odds(&self, sport: &str, region: &str, markets: &str) -> Result<Vec<Event>>;
}
