//! Integration tests for the authentication endpoints, against a mock
//! backend.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quetzal_console::api::auth::VerifyOutcome;
use quetzal_console::AppError;

use super::test_helpers;

#[tokio::test]
async fn login_returns_the_session_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({ "username": "ana", "password": "s3cret" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "expiresAt": 1_700_000_000_000_i64 })),
        )
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    let expires_at = api.login("ana", "s3cret").await.expect("login succeeds");

    let expected = Utc
        .timestamp_millis_opt(1_700_000_000_000)
        .single()
        .expect("valid timestamp");
    assert_eq!(expires_at, expected);
}

#[tokio::test]
async fn login_rejection_surfaces_the_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "credenciales inválidas" })),
        )
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    let err = api.login("ana", "wrong").await.expect_err("rejected");
    assert!(matches!(err, AppError::Auth(_)), "got {err:?}");
    assert_eq!(err.to_string(), "auth: credenciales inválidas");
}

#[tokio::test]
async fn login_rejection_without_message_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    let err = api.login("ana", "s3cret").await.expect_err("rejected");
    assert!(err.to_string().contains("login failed"), "got {err}");
    assert!(err.to_string().contains("500"), "got {err}");
}

#[tokio::test]
async fn login_without_expiry_in_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    let err = api.login("ana", "s3cret").await.expect_err("no expiry");
    assert!(matches!(err, AppError::Auth(_)));
    assert!(err.to_string().contains("expiry"), "got {err}");
}

#[tokio::test]
async fn login_transport_failure_is_an_http_error() {
    let api = test_helpers::api(test_helpers::UNREACHABLE);
    let err = api.login("ana", "s3cret").await.expect_err("no backend");
    assert!(matches!(err, AppError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn register_succeeds_on_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .and(body_json(json!({ "username": "ana", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    api.register("ana", "s3cret").await.expect("registered");
}

#[tokio::test]
async fn register_rejection_surfaces_the_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "el usuario ya existe" })),
        )
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    let err = api.register("ana", "s3cret").await.expect_err("conflict");
    assert_eq!(err.to_string(), "auth: el usuario ya existe");
}

#[tokio::test]
async fn refresh_succeeds_on_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    api.refresh().await.expect("refresh succeeds");
}

#[tokio::test]
async fn refresh_rejection_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    let err = api.refresh().await.expect_err("rejected");
    assert!(matches!(err, AppError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn logout_swallows_backend_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    // Must not error or panic — the call is fire-and-forget.
    api.logout().await;
}

#[tokio::test]
async fn logout_swallows_transport_failures() {
    let api = test_helpers::api(test_helpers::UNREACHABLE);
    api.logout().await;
}

#[tokio::test]
async fn verify_with_expiry_body_returns_the_instant() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/verify"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "expiresAt": 1_700_000_000_000_i64 })),
        )
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    let expected = Utc.timestamp_millis_opt(1_700_000_000_000).single();
    assert_eq!(
        api.verify().await,
        VerifyOutcome::Valid {
            expires_at: expected
        }
    );
}

#[tokio::test]
async fn verify_with_bare_2xx_returns_no_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/verify"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    assert_eq!(api.verify().await, VerifyOutcome::Valid { expires_at: None });
}

#[tokio::test]
async fn verify_rejection_is_silent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/verify"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    assert_eq!(api.verify().await, VerifyOutcome::NotAuthenticated);
}

#[tokio::test]
async fn verify_transport_failure_is_silent() {
    let api = test_helpers::api(test_helpers::UNREACHABLE);
    assert_eq!(api.verify().await, VerifyOutcome::NotAuthenticated);
}

#[tokio::test]
async fn session_cookie_flows_to_subsequent_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc123; Path=/")
                .set_body_json(json!({ "expiresAt": 1_700_000_000_000_i64 })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tipo-cambio/dia"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "fecha": "07/08/2026", "valor": 7.75 }
        })))
        .mount(&server)
        .await;

    let api = test_helpers::api(&server.uri());
    api.login("ana", "s3cret").await.expect("login succeeds");

    // The rate request only matches with the session cookie attached.
    let rate = api.daily_rate().await.expect("cookie carried over");
    assert!((rate.valor - 7.75).abs() < f64::EPSILON);
}
