pub mod odds_api;
