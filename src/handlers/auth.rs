use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tokio::task;

use crate::auth::{self, Claims};
use crate::config;
use crate::database::users::UserRepository;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::schemas::validate_new_user;

/// POST /api/auth/register
pub async fn register(Json(body): Json<Value>) -> Result<impl IntoResponse, ApiError> {
    let new_user =
        validate_new_user(&body).map_err(|errors| ApiError::validation("Invalid data", errors))?;

    let pool = DatabaseManager::pool().await?;
    let users = UserRepository::new(pool);

    if users.find_by_email(&new_user.email).await?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let password = new_user.password.clone();
    let password_hash = task::spawn_blocking(move || auth::hash_password(&password)).await??;

    let user = users
        .create(
            &new_user.name,
            &new_user.email,
            &password_hash,
            new_user.role.as_str(),
        )
        .await?;

    let claims = Claims::new(user.id, user.email.clone(), new_user.role);
    let token = auth::generate_jwt(&claims)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": user.summary() })),
    ))
}

/// POST /api/auth/login
///
/// The same "Invalid credentials" answer covers an unknown email and a wrong
/// password, so the response does not reveal which one failed.
pub async fn login(Json(body): Json<Value>) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (
        body.get("email").and_then(Value::as_str),
        body.get("password").and_then(Value::as_str),
    ) else {
        return Err(ApiError::bad_request("Invalid credentials"));
    };

    let pool = DatabaseManager::pool().await?;
    let users = UserRepository::new(pool);

    let user = users
        .find_by_email(email)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid credentials"))?;

    let password = password.to_string();
    let password_hash = user.password_hash.clone();
    let verified =
        task::spawn_blocking(move || auth::verify_password(&password, &password_hash)).await?;

    if !verified {
        return Err(ApiError::bad_request("Invalid credentials"));
    }

    let role = user
        .role
        .parse()
        .map_err(|_| ApiError::internal("Internal server error"))?;

    let claims = Claims::new(user.id, user.email.clone(), role);
    let token = auth::generate_jwt(&claims)?;

    Ok(Json(json!({ "token": token, "user": user.summary() })))
}

/// POST /api/auth/forgot-password
///
/// Mail delivery is out of scope; the reset link is logged server-side so
/// an operator can hand it over.
pub async fn forgot_password(Json(body): Json<Value>) -> Result<impl IntoResponse, ApiError> {
    let email = body
        .get("email")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("Email is required"))?;

    let pool = DatabaseManager::pool().await?;
    let users = UserRepository::new(pool);

    if users.find_by_email(email).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let token = auth::generate_reset_token();
    let expiry_minutes = config::config().security.reset_token_expiry_minutes;
    let expires = Utc::now() + Duration::minutes(expiry_minutes as i64);

    users.set_reset_token(email, &token, expires).await?;

    tracing::info!(
        email,
        "password reset requested; reset link: /reset-password?token={}&email={}",
        token,
        email
    );

    Ok(Json(json!({
        "message": "Password reset instructions have been sent to your email."
    })))
}

/// POST /api/auth/reset-password
pub async fn reset_password(Json(body): Json<Value>) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(token), Some(new_password)) = (
        body.get("email").and_then(Value::as_str),
        body.get("token").and_then(Value::as_str),
        body.get("newPassword").and_then(Value::as_str),
    ) else {
        return Err(ApiError::bad_request("Invalid Token"));
    };

    let pool = DatabaseManager::pool().await?;
    let users = UserRepository::new(pool);

    let user = users
        .find_by_email(email)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid Token"))?;

    let token_matches = user.reset_token.as_deref() == Some(token);
    let token_live = user
        .reset_token_expires
        .is_some_and(|expires| expires > Utc::now());

    if !token_matches || !token_live {
        return Err(ApiError::bad_request("Invalid Token"));
    }

    let new_password = new_password.to_string();
    let password_hash = task::spawn_blocking(move || auth::hash_password(&new_password)).await??;

    users.reset_password(email, &password_hash).await?;

    Ok(Json(json!({
        "message": "Your password has been successfully updated."
    })))
}
