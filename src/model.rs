//! Wire types for The Odds API v4.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry from `GET /v4/sports`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Sport {
    pub key: String,
    pub group: String,
    pub title: String,
    pub description: Option<String>,
    pub active: bool,
    pub has_outrights: bool,
}

/// One event from `GET /v4/sports/{sport}/odds`.
///
/// Fields the API occasionally omits stay `Option` so a sparse event
/// deserializes instead of failing the whole round.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    pub sport_key: String,
    pub sport_title: String,
    pub commence_time: Option<DateTime<Utc>>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Bookmaker {
    pub key: String,
    pub title: String,
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub markets: Vec<Market>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Market {
    pub key: String,
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub price: f64,
    pub point: Option<f64>,
}
