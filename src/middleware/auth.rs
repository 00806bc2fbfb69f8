use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::auth::{Claims, Role};
use crate::config;
use crate::error::ApiError;

/// Authenticated user context extracted from a verified JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// JWT authentication middleware that validates bearer tokens and attaches
/// the caller's identity to the request.
///
/// Failure modes, in order:
/// - missing/malformed Authorization header -> 401
/// - signature mismatch, expiry, malformed payload -> 401
/// - role outside the closed {admin, seller} set -> 403
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized - Missing or malformed token"))?;

    let claims = validate_jwt(&token)?;

    let role = claims
        .role
        .parse::<Role>()
        .map_err(|_| ApiError::forbidden("Invalid role in token"))?;

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        email: claims.email,
        role,
    });

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Validate the token signature and expiry, returning the embedded claims
fn validate_jwt(token: &str) -> Result<Claims, ApiError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(ApiError::unauthorized("JWT secret not configured"));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|_| ApiError::unauthorized("Unauthorized - Invalid token"))?;

    Ok(token_data.claims)
}
