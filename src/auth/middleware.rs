//! Authentication Middleware
//! Mission: Resolve bearer tokens to identities and gate admin-only routes

use crate::auth::{
    jwt::JwtHandler,
    models::AuthContext,
    user_store::UserStore,
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// What the authenticator needs: a verifier and the store to re-check the identity
#[derive(Clone)]
pub struct AuthLayerState {
    pub jwt_handler: Arc<JwtHandler>,
    pub user_store: Arc<UserStore>,
}

/// Auth middleware that validates JWT tokens and attaches an `AuthContext`.
/// Every failure answers directly; the inner service is never reached.
pub async fn auth_middleware(
    State(state): State<AuthLayerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let claims = state.jwt_handler.verify(&token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        AuthError::InvalidToken
    })?;

    let user = state
        .user_store
        .find_by_id(&claims.user_id)
        .await
        .map_err(|e| {
            error!("User lookup failed during authentication: {:#}", e);
            AuthError::LookupFailed
        })?
        .ok_or(AuthError::UnknownUser)?;

    req.extensions_mut().insert(AuthContext {
        id: user.id,
        role: user.role,
    });

    Ok(next.run(req).await)
}

/// Role gate; must be layered inside `auth_middleware`.
/// A request without an `AuthContext` is treated as non-admin.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AuthError> {
    match extract_auth(&req) {
        Some(ctx) if ctx.is_admin() => Ok(next.run(req).await),
        _ => Err(AuthError::Forbidden),
    }
}

/// Extract the identity from request (use after auth middleware)
pub fn extract_auth(req: &Request) -> Option<&AuthContext> {
    req.extensions().get::<AuthContext>()
}

/// Auth error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    UnknownUser,
    Forbidden,
    LookupFailed,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Unauthorized - no token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthError::UnknownUser => (StatusCode::UNAUTHORIZED, "Unauthorized - user not found"),
            AuthError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Forbidden - you do not have permission to access this resource",
            ),
            AuthError::LookupFailed => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
