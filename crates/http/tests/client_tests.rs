//! Integration tests for the Singularity HTTP client

use serde_json::json;
use singularity_core::{
    LoginCredentials, MemoryStorage, Registration, SessionEvents, TokenStore, UserClass,
};
use singularity_http::client::{ApiClient, ClientConfig, SessionManager, error::ClientError};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

fn user_json() -> serde_json::Value {
    json!({
        "id": "64f1c2",
        "username": "neo",
        "email": "a@b.com",
        "full_name": "Thomas Anderson",
        "user_class": "mage",
        "level": 3,
        "experience": 120,
        "created_at": "2024-05-01T12:00:00Z"
    })
}

#[tokio::test]
async fn test_client_builder() {
    let client = ApiClient::builder()
        .base_url("http://localhost:8000/api")
        .timeout(Duration::from_secs(5))
        .build();

    assert!(client.is_ok());
    assert_eq!(client.unwrap().base_url(), "http://localhost:8000/api");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = ApiClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_login_posts_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "email": "a@b.com", "password": "Passw0rd!" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "AT1",
            "refresh_token": "RT1",
            "token_type": "bearer",
            "user": user_json()
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(api_url(&mock_server)).unwrap();
    let tokens = client
        .login(&LoginCredentials::new("a@b.com", "Passw0rd!"))
        .await
        .unwrap();

    assert_eq!(tokens.access_token, "AT1");
    assert_eq!(tokens.refresh_token, "RT1");
    assert_eq!(tokens.user.unwrap().user_class, UserClass::Mage);
}

#[tokio::test]
async fn test_register_posts_full_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "username": "neo",
            "email": "a@b.com",
            "password": "Passw0rd!",
            "full_name": "Thomas Anderson",
            "user_class": "rogue"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "AT1",
            "refresh_token": "RT1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(api_url(&mock_server)).unwrap();
    let registration = Registration {
        username: "neo".to_string(),
        email: "a@b.com".to_string(),
        password: "Passw0rd!".to_string(),
        full_name: "Thomas Anderson".to_string(),
        user_class: UserClass::Rogue,
    };

    let tokens = client.register(&registration).await.unwrap();
    assert_eq!(tokens.access_token, "AT1");
}

#[tokio::test]
async fn test_refresh_sends_refresh_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "RT1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "AT2",
            "token_type": "bearer"
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(api_url(&mock_server)).unwrap();
    let refreshed = client.refresh("RT1").await.unwrap();
    assert_eq!(refreshed.access_token, "AT2");
}

#[tokio::test]
async fn test_error_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid credentials" })),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "detail": "Too many requests. Please try again later."
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(api_url(&mock_server)).unwrap();

    let result = client
        .login(&LoginCredentials::new("a@b.com", "wrong-password"))
        .await;
    let error = result.unwrap_err();
    assert!(error.is_auth_expired());
    assert_eq!(error.detail().as_deref(), Some("Invalid credentials"));

    let registration = Registration {
        username: "neo".to_string(),
        email: "a@b.com".to_string(),
        password: "Passw0rd!".to_string(),
        full_name: "Thomas Anderson".to_string(),
        user_class: UserClass::Warrior,
    };
    let error = client.register(&registration).await.unwrap_err();
    assert!(matches!(error, ClientError::ServerError { status: 429, .. }));
}

#[tokio::test]
async fn test_invalid_json_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(api_url(&mock_server)).unwrap();
    let result = client.refresh("RT1").await;
    assert!(matches!(result, Err(ClientError::Serialization(_))));
}

#[tokio::test]
async fn test_request_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({ "access_token": "AT1", "refresh_token": "RT1" })),
        )
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder()
        .base_url(api_url(&mock_server))
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let result = client
        .login(&LoginCredentials::new("a@b.com", "Passw0rd!"))
        .await;
    assert!(matches!(result, Err(ClientError::Timeout)));

    // A timed out login is an ordinary failure for the UI
    let manager = SessionManager::from_parts(
        client,
        TokenStore::new(Arc::new(MemoryStorage::new())),
        SessionEvents::new(),
    );
    let result = manager
        .login(&LoginCredentials::new("a@b.com", "Passw0rd!"))
        .await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Login failed"));
    assert!(manager.store().access_token().is_none());
}

#[tokio::test]
async fn test_manager_rejects_invalid_config() {
    let config = ClientConfig {
        timeout_secs: 0,
        ..ClientConfig::default()
    };
    let result = SessionManager::new(&config, Arc::new(MemoryStorage::new()));
    assert!(matches!(result, Err(ClientError::Core(_))));
}
