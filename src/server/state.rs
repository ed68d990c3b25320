use std::sync::{Arc, Mutex};

use reqwest::Client;

use super::auth::TokenVerifier;
use crate::{
    config::AppConfig,
    providers::{FootballDataClient, FplClient},
    storage::Database,
    Result,
};

/// Shared application state behind `web::Data`
pub struct AppState {
    db: Mutex<Database>,
    pub config: AppConfig,
    pub fpl: FplClient,
    http: Client,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: Database,
        client: Client,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let fpl = FplClient::new(client.clone(), config.fpl_base_url.clone());

        Self {
            db: Mutex::new(db),
            config,
            fpl,
            http: client,
            verifier,
        }
    }

    /// Football-Data client; `MissingConfig` without an API key
    pub fn football_data(&self) -> Result<FootballDataClient> {
        let key = self.config.require_football_data_key()?;
        Ok(FootballDataClient::new(
            self.http.clone(),
            self.config.football_data_base_url.clone(),
            key,
        ))
    }

    /// Run `f` with exclusive access to the database.
    ///
    /// `f` is synchronous, so the lock can never be held across an await.
    pub fn with_db<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut db = self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut db)
    }
}
