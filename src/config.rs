//! Runtime configuration read from the environment

use std::path::PathBuf;

use crate::providers::{football_data::FOOTBALL_DATA_BASE_URL, fpl::FPL_BASE_URL};
use crate::storage::Database;
use crate::{
    FantasyError, Result, UserId, ADMIN_USER_IDS_ENV_VAR, APP_ENV_ENV_VAR, AUTH_API_KEY_ENV_VAR,
    AUTH_URL_ENV_VAR, BIND_ADDR_ENV_VAR, CRON_SECRET_ENV_VAR, DB_PATH_ENV_VAR,
    FOOTBALL_DATA_API_KEY_ENV_VAR, FOOTBALL_DATA_BASE_URL_ENV_VAR, FPL_BASE_URL_ENV_VAR,
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEVELOPMENT: &str = "development";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bind_addr: String,
    pub app_env: String,
    pub auth_url: Option<String>,
    pub auth_api_key: Option<String>,
    pub admin_user_ids: Vec<String>,
    pub cron_secret: Option<String>,
    pub football_data_api_key: Option<String>,
    pub fpl_base_url: String,
    pub football_data_base_url: String,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = match get(DB_PATH_ENV_VAR) {
            Some(path) => PathBuf::from(path),
            None => Database::default_path()?,
        };

        Ok(Self {
            db_path,
            bind_addr: get(BIND_ADDR_ENV_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            app_env: get(APP_ENV_ENV_VAR).unwrap_or_else(|| "production".to_string()),
            auth_url: get(AUTH_URL_ENV_VAR).map(|u| u.trim_end_matches('/').to_string()),
            auth_api_key: get(AUTH_API_KEY_ENV_VAR),
            admin_user_ids: get(ADMIN_USER_IDS_ENV_VAR)
                .map(|ids| parse_id_list(&ids))
                .unwrap_or_default(),
            cron_secret: get(CRON_SECRET_ENV_VAR),
            football_data_api_key: get(FOOTBALL_DATA_API_KEY_ENV_VAR),
            fpl_base_url: get(FPL_BASE_URL_ENV_VAR).unwrap_or_else(|| FPL_BASE_URL.to_string()),
            football_data_base_url: get(FOOTBALL_DATA_BASE_URL_ENV_VAR)
                .unwrap_or_else(|| FOOTBALL_DATA_BASE_URL.to_string()),
        })
    }

    pub fn with_db_path(mut self, db_path: Option<PathBuf>) -> Self {
        if let Some(path) = db_path {
            self.db_path = path;
        }
        self
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case(DEVELOPMENT)
    }

    pub fn is_admin(&self, user_id: &UserId) -> bool {
        self.admin_user_ids.iter().any(|id| id == user_id.as_str())
    }

    pub fn require_auth_url(&self) -> Result<&str> {
        self.auth_url
            .as_deref()
            .ok_or_else(|| FantasyError::MissingConfig {
                env_var: AUTH_URL_ENV_VAR.to_string(),
            })
    }

    pub fn require_football_data_key(&self) -> Result<&str> {
        self.football_data_api_key
            .as_deref()
            .ok_or_else(|| FantasyError::MissingConfig {
                env_var: FOOTBALL_DATA_API_KEY_ENV_VAR.to_string(),
            })
    }
}

/// Split a comma separated list, dropping blanks
fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[(DB_PATH_ENV_VAR, "/tmp/fantasy.db")]);
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/fantasy.db"));
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(cfg.fpl_base_url, FPL_BASE_URL);
        assert!(cfg.admin_user_ids.is_empty());
        assert!(!cfg.is_development());
        assert!(cfg.require_auth_url().is_err());
        assert!(cfg.require_football_data_key().is_err());
    }

    #[test]
    fn test_football_data_key() {
        let cfg = config(&[
            (DB_PATH_ENV_VAR, "/tmp/fantasy.db"),
            (FOOTBALL_DATA_API_KEY_ENV_VAR, "fd-key"),
        ]);
        assert_eq!(cfg.require_football_data_key().unwrap(), "fd-key");
    }

    #[test]
    fn test_admin_list_parsing() {
        let cfg = config(&[
            (DB_PATH_ENV_VAR, "/tmp/fantasy.db"),
            (ADMIN_USER_IDS_ENV_VAR, " alice, ,bob ,"),
        ]);
        assert_eq!(cfg.admin_user_ids, vec!["alice", "bob"]);
        assert!(cfg.is_admin(&UserId::new("bob")));
        assert!(!cfg.is_admin(&UserId::new("carol")));
    }

    #[test]
    fn test_development_and_trailing_slash() {
        let cfg = config(&[
            (DB_PATH_ENV_VAR, "/tmp/fantasy.db"),
            (APP_ENV_ENV_VAR, "Development"),
            (AUTH_URL_ENV_VAR, "https://auth.example.test/"),
        ]);
        assert!(cfg.is_development());
        assert_eq!(cfg.require_auth_url().unwrap(), "https://auth.example.test");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let cfg = config(&[
            (DB_PATH_ENV_VAR, "/tmp/fantasy.db"),
            (CRON_SECRET_ENV_VAR, "   "),
        ]);
        assert!(cfg.cron_secret.is_none());
    }

    #[test]
    fn test_db_override() {
        let cfg = config(&[(DB_PATH_ENV_VAR, "/tmp/a.db")])
            .with_db_path(Some(PathBuf::from("/tmp/b.db")));
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/b.db"));
    }
}
