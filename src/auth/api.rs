//! Authentication API Endpoints
//! Mission: Provide registration and login endpoints

use crate::auth::{
    models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserResponse},
    service::CredentialService,
};
use crate::errors::ApiError;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use tracing::info;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub credentials: CredentialService,
}

impl AuthState {
    pub fn new(credentials: CredentialService) -> Self {
        Self { credentials }
    }
}

/// Presence check shared by the auth endpoints; blank strings count as absent
fn required(field: Option<String>) -> Result<String, ApiError> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Missing required fields".to_string()))
}

/// Register endpoint - POST /register
pub async fn register(
    State(state): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(payload) = payload?;
    let username = required(payload.username)?;
    let email = required(payload.email)?;
    let password = required(payload.password)?;

    info!("📝 Registration attempt: {}", username.trim());

    let user = state
        .credentials
        .register(&username, &email, &password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// Login endpoint - POST /login
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;
    let email = required(payload.email)?;
    let password = required(payload.password)?;

    info!("🔐 Login attempt: {}", email.trim());

    let (user, issued) = state.credentials.login(&email, &password).await?;

    Ok(Json(LoginResponse {
        message: "User logged in successfully",
        user: UserResponse::from_user(&user),
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}
