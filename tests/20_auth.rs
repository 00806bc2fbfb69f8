mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use catalog_api::client::{ApiClient, ClientError};

#[tokio::test]
async fn register_rejects_short_name_with_field_detail() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({
            "name": "Te",
            "email": common::unique_email("shortname"),
            "password": "12345678",
            "role": "seller",
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid data");
    assert_eq!(
        body["details"]["fieldErrors"]["name"][0],
        "Name must have at least 3 characters"
    );
    Ok(())
}

#[tokio::test]
async fn register_rejects_roles_outside_the_closed_set() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({
            "name": "Test User",
            "email": common::unique_email("badrole"),
            "password": "12345678",
            "role": "client",
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(
        body["details"]["fieldErrors"]["role"][0],
        "Role must be 'seller' or 'admin'"
    );
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let email = common::unique_email("duplicate");

    let mut first = ApiClient::new(server.base_url.clone());
    first
        .register("Test User", &email, "password123", "seller")
        .await?;

    let mut second = ApiClient::new(server.base_url.clone());
    let err = second
        .register("Test User", &email, "password123", "seller")
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "User already exists");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn login_round_trip_and_wrong_password() -> Result<()> {
    let server = common::ensure_server().await?;
    let email = common::unique_email("login");

    let mut client = ApiClient::new(server.base_url.clone());
    let registered = client
        .register("Test User", &email, "password123", "seller")
        .await?;
    assert_eq!(registered.user.role, "seller");

    // Correct credentials issue a fresh token
    let auth = client.login(&email, "password123").await?;
    assert!(!auth.token.is_empty());
    assert_eq!(auth.user.email, email);

    // Wrong password: 400 "Invalid credentials", no token issued
    let mut other = ApiClient::new(server.base_url.clone());
    let err = other.login(&email, "wrong-password").await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(other.token().is_none());
    Ok(())
}

#[tokio::test]
async fn unknown_email_gets_the_same_credentials_answer() -> Result<()> {
    let server = common::ensure_server().await?;

    let mut client = ApiClient::new(server.base_url.clone());
    let err = client
        .login(&common::unique_email("nobody"), "password123")
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // No Authorization header at all
    let res = client
        .get(format!("{}/api/products", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Unauthorized - Missing or malformed token");

    // Wrong scheme
    let res = client
        .get(format!("{}/api/products", server.base_url))
        .header("Authorization", "Basic abc")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Tampered token
    let res = client
        .get(format!("{}/api/products", server.base_url))
        .header("Authorization", "Bearer not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Unauthorized - Invalid token");
    Ok(())
}

#[tokio::test]
async fn forgot_password_for_unknown_user_is_404() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/forgot-password", server.base_url))
        .json(&json!({ "email": common::unique_email("ghost") }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "User not found");
    Ok(())
}

#[tokio::test]
async fn reset_password_rejects_a_wrong_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let email = common::unique_email("reset");

    let mut client = ApiClient::new(server.base_url.clone());
    client
        .register("Test User", &email, "password123", "seller")
        .await?;

    let raw = reqwest::Client::new();
    let res = raw
        .post(format!("{}/api/auth/forgot-password", server.base_url))
        .json(&json!({ "email": email }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // A token that was never issued must not pass
    let res = raw
        .post(format!("{}/api/auth/reset-password", server.base_url))
        .json(&json!({
            "email": email,
            "token": "0000000000000000000000000000000000000000000000000000000000000000",
            "newPassword": "newpassword123",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid Token");

    // Old password still works
    client.login(&email, "password123").await?;
    Ok(())
}
