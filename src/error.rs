//! Error types for the fantasy rooms backend

use thiserror::Error;


pub type Result<T> = std::result::Result<T, FantasyError>;

#[derive(Error, Debug)]
pub enum FantasyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to parse number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("{env_var} environment variable not set")]
    MissingConfig { env_var: String },

    #[error("Invalid position: {position}")]
    InvalidPosition { position: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied: {message}")]
    Forbidden { message: String },

    #[error("{provider} returned an unusable response: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FantasyError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        FantasyError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        FantasyError::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        FantasyError::Conflict {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        FantasyError::Forbidden {
            message: message.into(),
        }
    }
}
