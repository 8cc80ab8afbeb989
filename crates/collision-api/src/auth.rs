//! Bearer-token authentication.
//!
//! The JWT carries the principal id and subscription tier; the tier claim is
//! authoritative for the lifetime of the request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use collision_core::{Principal, SubscriptionTier};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub tier: SubscriptionTier,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a token for a principal; used by the auth service and by tests.
pub fn encode_token(
    principal: &Principal,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: principal.id.to_string(),
        tier: principal.tier,
        iat: now,
        exp: now + ttl_seconds,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> Result<Principal, ApiError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| ApiError::unauthorized(format!("invalid token: {}", e)))?;

    let id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| ApiError::unauthorized("invalid subject claim"))?;

    Ok(Principal {
        id,
        tier: data.claims.tier,
    })
}

/// Extracts the bearer principal and stores it in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
        .ok_or_else(|| ApiError::unauthorized("missing bearer credential"))?;

    let principal = decode_token(&token, state.jwt_secret())?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
