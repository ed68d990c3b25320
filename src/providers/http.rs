//! HTTP plumbing shared by the provider clients

use crate::{FantasyError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("fantasy-rooms/", env!("CARGO_PKG_VERSION"));

/// Upper bound on any single provider request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the reqwest client used for provider and auth calls.
pub fn build_client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Headers for Football-Data.org: JSON accept plus the `X-Auth-Token` key.
pub fn football_data_headers(api_key: &str) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("application/json"));
    h.insert("X-Auth-Token", HeaderValue::from_str(api_key.trim())?);
    Ok(h)
}

/// A non-2xx status becomes [`FantasyError::Provider`] naming the source.
pub fn check_status(provider: &'static str, status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(FantasyError::Provider {
        provider,
        message: format!("HTTP {}", status),
    })
}

/// Decode a provider response body after checking its status.
pub async fn read_json<T: DeserializeOwned>(provider: &'static str, response: Response) -> Result<T> {
    check_status(provider, response.status())?;
    Ok(response.json::<T>().await?)
}
