//! Centralized error responder
//!
//! Service layers return typed errors; they become HTTP responses only here.
//! Every error body has the shape `{status, message}`. Outside production the
//! [`error_responder`] middleware adds a `stack` field to 500s carrying the
//! error chain.

use crate::auth::service::CredentialError;
use crate::catalog::store::CatalogError;
use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    NotFound(String),
    #[error("error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Diagnostic detail riding on a 500 response until the responder decides
/// whether to expose it.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    pub stack: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        let mut response = (
            status,
            Json(json!({ "status": "error", "message": message })),
        )
            .into_response();

        if let ApiError::Internal(err) = &self {
            error!("Unhandled error: {:#}", err);
            response.extensions_mut().insert(ErrorDetail {
                message,
                stack: format!("{:?}", err),
            });
        }

        response
    }
}

impl From<CredentialError> for ApiError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::Validation(msg) => ApiError::Validation(msg),
            CredentialError::Conflict => {
                ApiError::Conflict(CredentialError::Conflict.to_string())
            }
            CredentialError::InvalidCredentials => ApiError::InvalidCredentials,
            CredentialError::Token(err) => ApiError::Internal(err.into()),
            CredentialError::Internal(err) => ApiError::Internal(err),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Validation(msg) => ApiError::Validation(msg),
            CatalogError::DuplicateIsbn => {
                ApiError::Conflict(CatalogError::DuplicateIsbn.to_string())
            }
            CatalogError::NotFound => ApiError::NotFound(CatalogError::NotFound.to_string()),
            CatalogError::Internal(err) => ApiError::Internal(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Whether 500 responses carry their error chain
#[derive(Debug, Clone, Copy)]
pub struct ErrorVerbosity {
    pub expose_stack: bool,
}

/// Outermost error stage: adds `stack` to 500 bodies when allowed
pub async fn error_responder(
    State(verbosity): State<ErrorVerbosity>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;

    let Some(detail) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    if !verbosity.expose_stack {
        return response;
    }

    (
        response.status(),
        Json(json!({
            "status": "error",
            "message": detail.message,
            "stack": detail.stack,
        })),
    )
        .into_response()
}
