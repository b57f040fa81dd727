use crate::e2e::helpers;

use capture_desk::domain::session::AuthSessionManager;
use capture_desk::error::AppError;
use capture_desk::infrastructure::http::BackendGateway;
use capture_desk::infrastructure::store::{FileTokenStore, InMemoryTokenStore};
use helpers::mock_backend::{TEST_EMAIL, VALID_CODE};
use helpers::{free_port, generate_test_jwt, TestContext};
use pretty_assertions::assert_eq;
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_authenticated_calls_without_touching_the_network(ctx: &TestContext) {
    let err = ctx
        .gateway
        .call(Method::GET, "/api/captures", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotAuthenticated));
    assert!(err.requires_reauth());
    assert_eq!(ctx.backend.request_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_exchange_code_for_a_persisted_session(ctx: &TestContext) {
    let login = ctx.gateway.exchange_code_for_session(VALID_CODE).await.unwrap();

    assert_eq!(login.user.email, TEST_EMAIL);
    assert_eq!(login.user.display_name.as_deref(), Some("Ada Lovelace"));
    assert!(ctx.sessions.is_authenticated().await.unwrap());
    assert_eq!(
        ctx.sessions.get_user().await.unwrap().map(|user| user.email),
        Some(TEST_EMAIL.to_string())
    );
    assert_eq!(ctx.sessions.get_token().await.unwrap(), Some(login.token));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_surface_backend_detail_when_login_is_rejected(ctx: &TestContext) {
    let err = ctx
        .gateway
        .exchange_code_for_session("not-a-real-code")
        .await
        .unwrap_err();

    match err {
        AppError::LoginFailed(detail) => assert_eq!(detail, "Invalid authorization code"),
        other => panic!("expected LoginFailed, got {:?}", other),
    }
    assert!(!ctx.sessions.is_authenticated().await.unwrap());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clear_the_session_when_backend_answers_401(ctx: &TestContext) {
    ctx.sign_in(TEST_EMAIL).await;
    ctx.backend.reject_sessions();

    let err = ctx
        .gateway
        .call(Method::GET, "/api/captures", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::SessionExpired));
    assert!(err.requires_reauth());
    assert!(!ctx.sessions.is_authenticated().await.unwrap());
    assert_eq!(ctx.sessions.get_user().await.unwrap(), None);
    assert_eq!(ctx.backend.request_count(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_drop_an_expired_session_on_read(ctx: &TestContext) {
    let token = generate_test_jwt(TEST_EMAIL, -chrono::Duration::minutes(1));
    ctx.sessions
        .save(&token, capture_desk::domain::session::UserProfile::new(TEST_EMAIL))
        .await
        .unwrap();

    assert_eq!(ctx.sessions.get_session().await.unwrap(), None);
    assert_eq!(ctx.sessions.get_user().await.unwrap(), None);

    let err = ctx
        .gateway
        .call(Method::GET, "/api/captures", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotAuthenticated));
    assert_eq!(ctx.backend.request_count(), 0);
}

#[tokio::test]
async fn it_should_report_an_unreachable_backend_distinctly() {
    let sessions = Arc::new(AuthSessionManager::new(Arc::new(InMemoryTokenStore::new())));
    let gateway = BackendGateway::new(
        format!("http://127.0.0.1:{}", free_port()),
        sessions.clone(),
        Duration::from_secs(2),
    )
    .unwrap();

    let err = gateway.exchange_code_for_session(VALID_CODE).await.unwrap_err();
    assert!(matches!(err, AppError::BackendUnreachable(_)));
    assert!(err.user_message().contains("not reachable"));

    let token = generate_test_jwt(TEST_EMAIL, chrono::Duration::hours(1));
    sessions
        .save(&token, capture_desk::domain::session::UserProfile::new(TEST_EMAIL))
        .await
        .unwrap();

    let err = gateway
        .call(Method::GET, "/api/captures", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BackendUnreachable(_)));
    assert!(!err.requires_reauth());
    assert!(sessions.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn it_should_keep_the_session_across_restarts() {
    let data_dir = std::env::temp_dir().join(format!("capture-desk-{}", uuid::Uuid::new_v4()));
    let token = generate_test_jwt(TEST_EMAIL, chrono::Duration::hours(1));

    let first_run = AuthSessionManager::new(Arc::new(FileTokenStore::new(&data_dir)));
    first_run
        .save(&token, capture_desk::domain::session::UserProfile::new(TEST_EMAIL))
        .await
        .unwrap();

    let second_run = AuthSessionManager::new(Arc::new(FileTokenStore::new(&data_dir)));
    assert_eq!(second_run.get_token().await.unwrap(), Some(token));

    second_run.clear().await.unwrap();
    let third_run = AuthSessionManager::new(Arc::new(FileTokenStore::new(&data_dir)));
    assert!(!third_run.is_authenticated().await.unwrap());

    let _ = tokio::fs::remove_dir_all(&data_dir).await;
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_backend_health_without_a_session(ctx: &TestContext) {
    assert!(ctx.gateway.health().await.unwrap());
    assert_eq!(ctx.backend.request_count(), 1);
}
