//! actix-web JSON API
//!
//! - `auth`: bearer-token verification and request extractors
//! - `response`: the `{success, data, error}` envelope and error statuses
//! - `routes`: handlers and route table
//! - `state`: shared application state

pub mod auth;
pub mod response;
pub mod routes;
pub mod state;

#[cfg(test)]
mod tests;

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;

use crate::{config::AppConfig, providers::http::build_client, storage::Database, Result};
use auth::HttpTokenVerifier;
use state::AppState;

pub use routes::configure;

/// Open the database and serve the API until shutdown.
pub async fn run(config: AppConfig) -> Result<()> {
    let db = Database::open(&config.db_path)?;
    let client = build_client()?;
    let verifier = HttpTokenVerifier::from_config(client.clone(), &config)?;
    let bind_addr = config.bind_addr.clone();

    if config.cron_secret.is_none() && !config.is_development() {
        tracing::warn!("CRON_SECRET is not set; the cron endpoint will reject every call");
    }

    let state = web::Data::new(AppState::new(config, db, client, Arc::new(verifier)));

    info!(bind = %bind_addr, "starting HTTP server");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
