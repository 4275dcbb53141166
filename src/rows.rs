//! Flattens nested odds events into tabular rows, one per outcome.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Event;

/// One CSV row: a single priced outcome with its full event, bookmaker and
/// market context denormalized alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct OddsRow {
    pub sport: String,
    pub sport_key: String,
    pub game_id: String,
    pub game_time: Option<DateTime<Utc>>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub bookmaker_key: String,
    pub bookmaker_title: String,
    pub bookmaker_last_update: Option<DateTime<Utc>>,
    pub market: String,
    pub market_last_update: Option<DateTime<Utc>>,
    pub team: String,
    pub price: f64,
    pub point: Option<f64>,
    pub query_time: String,
}

/// Walks event → bookmaker → market → outcome and emits one row per
/// outcome. Events with no bookmakers contribute nothing.
pub fn flatten_events(events: &[Event], query_time: &str) -> Vec<OddsRow> {
    let mut rows = Vec::new();

    for event in events {
        for bookmaker in &event.bookmakers {
            for market in &bookmaker.markets {
                for outcome in &market.outcomes {
                    rows.push(OddsRow {
                        sport: event.sport_title.clone(),
                        sport_key: event.sport_key.clone(),
                        game_id: event.id.clone(),
                        game_time: event.commence_time,
                        home_team: event.home_team.clone(),
                        away_team: event.away_team.clone(),
                        bookmaker_key: bookmaker.key.clone(),
                        bookmaker_title: bookmaker.title.clone(),
                        bookmaker_last_update: bookmaker.last_update,
                        market: market.key.clone(),
                        market_last_update: market.last_update,
                        team: outcome.name.clone(),
                        price: outcome.price,
                        point: outcome.point,
                        query_time: query_time.to_string(),
                    });
                }
            }
        }
    }

    rows
}
