//! Bearer-token authentication against the external auth service.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

use super::state::AppState;
use crate::{config::AppConfig, FantasyError, Result, UserId};

/// Identity returned by the auth service for a valid token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifiedUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Resolve a bearer token to a user, or fail with `Unauthorized`.
    async fn verify(&self, token: &str) -> Result<VerifiedUser>;
}

/// `GET {auth_url}/auth/v1/user` with the caller's token and the project key
pub struct HttpTokenVerifier {
    client: Client,
    user_url: String,
    api_key: Option<String>,
}

impl HttpTokenVerifier {
    pub fn new(client: Client, auth_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            user_url: format!("{}/auth/v1/user", auth_url.trim_end_matches('/')),
            api_key,
        }
    }

    pub fn from_config(client: Client, config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            client,
            config.require_auth_url()?,
            config.auth_api_key.clone(),
        ))
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedUser> {
        let mut request = self.client.get(&self.user_url).bearer_auth(token);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            debug!(status = %response.status(), "token rejected by auth service");
            return Err(FantasyError::Unauthorized);
        }
        let body = response.bytes().await?;
        parse_identity(&body)
    }
}

/// Decode the auth service's user payload. A body without a usable
/// identity means the token cannot be trusted.
pub fn parse_identity(body: &[u8]) -> Result<VerifiedUser> {
    serde_json::from_slice::<VerifiedUser>(body).map_err(|e| {
        debug!(error = %e, "unreadable identity from auth service");
        FantasyError::Unauthorized
    })
}

/// Fixed token table, for local runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, VerifiedUser>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: &str, id: &str, email: Option<&str>) -> Self {
        self.tokens.insert(
            token.to_string(),
            VerifiedUser {
                id: UserId::new(id),
                email: email.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedUser> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(FantasyError::Unauthorized)
    }
}

/// Parse `Authorization: Bearer <token>`
pub fn bearer_token(req: &HttpRequest) -> Result<String> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(FantasyError::Unauthorized)?
        .to_str()
        .map_err(|_| FantasyError::Unauthorized)?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("Bearer") || parts[1].is_empty() {
        return Err(FantasyError::Unauthorized);
    }
    Ok(parts[1].to_string())
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| FantasyError::Internal {
            message: "application state missing".to_string(),
        })
}

type ExtractFuture<T> = Pin<Box<dyn Future<Output = Result<T>>>>;

/// Authenticated caller. The user row is created or refreshed on first sight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = FantasyError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let token = bearer_token(&req)?;
            let state = app_state(&req)?;
            let user = state.verifier.verify(&token).await?;

            state.with_db(|db| db.upsert_user(&user.id, user.email.as_deref()))?;
            Ok(AuthUser {
                id: user.id,
                email: user.email,
            })
        })
    }
}

/// Authenticated caller on the admin allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub AuthUser);

impl FromRequest for AdminUser {
    type Error = FantasyError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let user = AuthUser::from_request(&req, payload);

        Box::pin(async move {
            let user = user.await?;
            let state = app_state(&req)?;
            if !state.config.is_admin(&user.id) {
                warn!(user = %user.id, path = %req.path(), "admin access denied");
                return Err(FantasyError::forbidden("admin access required"));
            }
            Ok(AdminUser(user))
        })
    }
}

/// Caller presenting the cron secret. Development deployments skip the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronCaller;

impl FromRequest for CronCaller {
    type Error = FantasyError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let state = app_state(&req)?;
            if state.config.is_development() {
                return Ok(CronCaller);
            }

            let secret = state
                .config
                .cron_secret
                .as_deref()
                .ok_or(FantasyError::Unauthorized)?;
            if bearer_token(&req)? != secret {
                return Err(FantasyError::Unauthorized);
            }
            Ok(CronCaller)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), "abc.def");

        for bad in ["Token abc", "Bearer", "Bearer a b", ""] {
            let req = TestRequest::default()
                .insert_header(("Authorization", bad))
                .to_http_request();
            assert!(bearer_token(&req).is_err(), "{bad:?} should be rejected");
        }

        let req = TestRequest::default().to_http_request();
        assert!(matches!(bearer_token(&req), Err(FantasyError::Unauthorized)));
    }

    #[actix_web::test]
    async fn test_static_verifier() {
        let verifier = StaticTokenVerifier::new().with_user("t1", "user-1", Some("a@b.test"));
        let user = verifier.verify("t1").await.unwrap();
        assert_eq!(user.id, UserId::new("user-1"));
        assert!(matches!(
            verifier.verify("nope").await,
            Err(FantasyError::Unauthorized)
        ));
    }

    #[test]
    fn test_parse_identity() {
        let user = parse_identity(br#"{"id": "user-9", "email": "u@example.test", "role": "x"}"#).unwrap();
        assert_eq!(user.id, UserId::new("user-9"));
        assert_eq!(user.email.as_deref(), Some("u@example.test"));

        let bad: [&[u8]; 3] = [b"<html>gateway</html>", b"", br#"{"email": "no-id@example.test"}"#];
        for body in bad {
            assert!(matches!(parse_identity(body), Err(FantasyError::Unauthorized)));
        }
    }

    #[test]
    fn test_user_url() {
        let verifier = HttpTokenVerifier::new(Client::new(), "https://auth.example.test/", None);
        assert_eq!(verifier.user_url, "https://auth.example.test/auth/v1/user");
    }
}
