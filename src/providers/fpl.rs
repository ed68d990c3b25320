//! Fantasy Premier League public API client

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::http::read_json;
use super::types::{Bootstrap, ElementSummary, FplFixture};
use crate::{Gameweek, Result};

/// Base path for the FPL public API.
pub const FPL_BASE_URL: &str = "https://fantasy.premierleague.com/api";

#[derive(Debug, Clone)]
pub struct FplClient {
    client: Client,
    base_url: String,
}

impl FplClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self.client.get(&url).query(query).send().await?;
        read_json("fpl", response).await
    }

    /// Teams, players and gameweek calendar
    pub async fn bootstrap(&self) -> Result<Bootstrap> {
        self.get_json("bootstrap-static/", &[]).await
    }

    pub async fn fixtures(&self, gameweek: Gameweek) -> Result<Vec<FplFixture>> {
        self.get_json("fixtures/", &[("event", gameweek.to_string())])
            .await
    }

    /// Per-fixture history for one FPL element id
    pub async fn element_summary(&self, element_id: u32) -> Result<ElementSummary> {
        self.get_json(&format!("element-summary/{}/", element_id), &[])
            .await
    }
}
