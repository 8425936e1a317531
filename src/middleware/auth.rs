// Bearer-token authentication
//
// Resolves the caller's `Identity` from an HS256 JWT. Role checks are not
// done here; the catalog service applies them per operation.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{AppState, Identity};
use crate::types::AppError;

/// Raw token header accepted alongside `Authorization: Bearer`.
pub const TOKEN_HEADER: &str = "token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(alias = "_id")]
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<Identity, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        warn!("Token verification failed: {}", e);
        AppError::Unauthenticated("invalid or expired token".to_string())
    })?;

    Ok(Identity::new(data.claims.sub, data.claims.role))
}

/// Sign a token for `identity` valid for `ttl_secs`.
pub fn issue_token(identity: &Identity, secret: &str, ttl_secs: i64) -> Result<String, AppError> {
    let exp = (chrono::Utc::now().timestamp() + ttl_secs).max(0) as usize;
    let claims = Claims {
        sub: identity.user_id.clone(),
        role: identity.role.clone(),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Unhandled(e.into()))
}

fn extract_token(parts: &Parts) -> Option<&str> {
    if let Some(bearer) = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        return Some(bearer.trim());
    }

    parts
        .headers
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)
            .ok_or_else(|| AppError::Unauthenticated("missing token".to_string()))?;

        verify_jwt(token, &state.auth.jwt_secret)
    }
}
