//! Football-Data.org v4 client (Premier League matches)

use reqwest::Client;
use tracing::debug;

use super::http::{football_data_headers, read_json};
use super::types::{FdMatch, MatchesResponse};
use crate::{Gameweek, Result};

pub const FOOTBALL_DATA_BASE_URL: &str = "https://api.football-data.org/v4";

/// Competition code for the Premier League
pub const PREMIER_LEAGUE: &str = "PL";

#[derive(Debug, Clone)]
pub struct FootballDataClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FootballDataClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Matches of one matchday (Football-Data's name for a gameweek)
    pub async fn matches(&self, gameweek: Gameweek) -> Result<Vec<FdMatch>> {
        let url = format!(
            "{}/competitions/{}/matches",
            self.base_url, PREMIER_LEAGUE
        );
        debug!(%url, matchday = %gameweek, "GET");

        let response = self
            .client
            .get(&url)
            .headers(football_data_headers(&self.api_key)?)
            .query(&[("matchday", gameweek.to_string())])
            .send()
            .await?;
        let res: MatchesResponse = read_json("football-data", response).await?;
        Ok(res.matches)
    }
}
