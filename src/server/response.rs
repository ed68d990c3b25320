//! JSON envelope and the HTTP mapping of [`FantasyError`].

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;

use crate::FantasyError;

/// `{ "success": bool, "data"?: T, "error"?: string }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// 200 with `data`
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data))
}

impl ResponseError for FantasyError {
    fn status_code(&self) -> StatusCode {
        match self {
            FantasyError::Validation { .. }
            | FantasyError::InvalidPosition { .. }
            | FantasyError::InvalidNumber(_)
            | FantasyError::Json(_) => StatusCode::BAD_REQUEST,
            FantasyError::Unauthorized => StatusCode::UNAUTHORIZED,
            FantasyError::Forbidden { .. } => StatusCode::FORBIDDEN,
            FantasyError::NotFound { .. } => StatusCode::NOT_FOUND,
            FantasyError::Conflict { .. } => StatusCode::CONFLICT,
            FantasyError::Provider { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ApiResponse::err(message))
    }
}
