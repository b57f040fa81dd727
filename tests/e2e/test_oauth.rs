use crate::e2e::helpers;

use capture_desk::controllers::oauth_callback::callback_routes;
use capture_desk::domain::oauth::{OAuthBroker, OAuthConfig, DEFAULT_REDIRECT_PORT};
use capture_desk::error::AppError;
use helpers::browser::{query_param, ProviderReply, ScriptedBrowser};
use helpers::mock_backend::VALID_CODE;
use helpers::{ephemeral_oauth_config, free_port, TestContext};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_the_code_from_the_callback(ctx: &TestContext) {
    let browser = Arc::new(ScriptedBrowser::new(ProviderReply::Code(VALID_CODE)));
    let broker = ctx.broker(browser.clone());

    let code = broker.start_oauth_flow().await.unwrap();

    assert_eq!(code, VALID_CODE);

    let opened = browser.opened_urls();
    assert_eq!(opened.len(), 1);
    assert_eq!(query_param(&opened[0], "access_type").as_deref(), Some("offline"));
    assert_eq!(query_param(&opened[0], "prompt").as_deref(), Some("consent"));
    assert_eq!(
        query_param(&opened[0], "client_id").as_deref(),
        Some("test-client-id.apps.googleusercontent.com")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_a_denied_consent(ctx: &TestContext) {
    let broker = ctx.broker(Arc::new(ScriptedBrowser::new(ProviderReply::Error(
        "access_denied",
    ))));

    let err = broker.start_oauth_flow().await.unwrap_err();

    match err {
        AppError::AuthorizationDenied(reason) => assert_eq!(reason, "access_denied"),
        other => panic!("expected AuthorizationDenied, got {:?}", other),
    }
}

#[tokio::test]
async fn it_should_release_the_port_after_a_completed_flow() {
    let port = free_port();
    let mut config = ephemeral_oauth_config();
    config.redirect_port = port;
    let broker = OAuthBroker::new(
        config,
        Arc::new(ScriptedBrowser::new(ProviderReply::Code(VALID_CODE))),
        callback_routes,
    );

    broker.start_oauth_flow().await.unwrap();

    std::net::TcpListener::bind(("127.0.0.1", port)).expect("port should be free again");
}

#[tokio::test(start_paused = true)]
async fn it_should_time_out_and_free_the_port_when_consent_never_arrives() {
    let port = free_port();
    let mut config = ephemeral_oauth_config();
    config.redirect_port = port;
    let broker = OAuthBroker::new(
        config,
        Arc::new(ScriptedBrowser::new(ProviderReply::Silent)),
        callback_routes,
    );

    let flow = tokio::spawn(async move { broker.start_oauth_flow().await });
    tokio::time::sleep(Duration::from_secs(6 * 60)).await;

    assert!(flow.is_finished());
    let err = flow.await.unwrap().unwrap_err();
    assert!(matches!(err, AppError::AuthorizationTimeout));

    std::net::TcpListener::bind(("127.0.0.1", port)).expect("port should be free again");
}

#[tokio::test]
#[serial]
async fn it_should_listen_on_the_default_loopback_port() {
    let browser = Arc::new(ScriptedBrowser::new(ProviderReply::Code(VALID_CODE)));
    let broker = OAuthBroker::new(OAuthConfig::new("client"), browser.clone(), callback_routes);

    broker.start_oauth_flow().await.unwrap();

    let opened = browser.opened_urls();
    assert_eq!(
        query_param(&opened[0], "redirect_uri"),
        Some(format!("http://127.0.0.1:{}/oauth2callback", DEFAULT_REDIRECT_PORT))
    );
}

#[tokio::test]
#[serial]
async fn it_should_fail_fast_when_the_loopback_port_is_taken() {
    let _occupied = std::net::TcpListener::bind(("127.0.0.1", DEFAULT_REDIRECT_PORT))
        .expect("default redirect port must be free for this test");
    let browser = Arc::new(ScriptedBrowser::new(ProviderReply::Code(VALID_CODE)));
    let broker = OAuthBroker::new(OAuthConfig::new("client"), browser.clone(), callback_routes);

    let err = broker.start_oauth_flow().await.unwrap_err();

    assert!(matches!(err, AppError::PortInUse(DEFAULT_REDIRECT_PORT)));
    assert!(browser.opened_urls().is_empty());
}
