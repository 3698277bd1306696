//! JWT Token Handler
//! Mission: Issue and verify HS256 session tokens

use crate::auth::models::{Claims, SessionClaims};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

/// Lifetime of tokens handed out at login
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signed token plus its lifetime in seconds
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
    pub expires_at: i64,
}

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key; login tokens live 1h
    pub fn new(secret: &str) -> Self {
        // Only HS256 is accepted; a token whose header names any other
        // algorithm is rejected before the signature is checked.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Issue a token for `claims` valid for the handler's ttl
    pub fn issue(&self, claims: &SessionClaims) -> Result<IssuedToken, TokenError> {
        self.issue_at(claims, Utc::now(), self.ttl)
    }

    /// Issue a token with an explicit issue time and ttl.
    /// Identical inputs produce the identical token.
    pub fn issue_at(
        &self,
        claims: &SessionClaims,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        let iat = issued_at.timestamp();
        let exp = iat + ttl.num_seconds();

        let payload = Claims {
            user_id: claims.user_id,
            role: claims.role,
            iat,
            exp,
        };

        debug!(
            "Generating JWT for user {} ({}), expires in {}s",
            claims.user_id,
            claims.role.as_str(),
            ttl.num_seconds()
        );

        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &self.encoding_key,
        )
        .map_err(TokenError::Signing)?;

        Ok(IssuedToken {
            token,
            expires_in: ttl.num_seconds(),
            expires_at: exp,
        })
    }

    /// Validate a JWT token and extract claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Invalid)?;

        debug!("Validated JWT for user {}", decoded.claims.user_id);

        Ok(decoded.claims)
    }
}
