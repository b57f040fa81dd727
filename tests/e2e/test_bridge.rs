use crate::e2e::helpers;

use capture_desk::controllers::bridge::{
    bridge_channel, BridgeClient, BridgeRequest, BridgeResponse, DesktopServices,
};
use capture_desk::domain::capture::{CaptureApi, CapturePayload, CaptureSubmitter, WindowContext};
use capture_desk::domain::session::UserProfile;
use helpers::browser::{ProviderReply, ScriptedBrowser};
use helpers::mock_backend::{TEST_EMAIL, VALID_CODE};
use helpers::TestContext;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use test_context::test_context;

fn start_bridge(ctx: &TestContext, reply: ProviderReply) -> BridgeClient {
    let services = Arc::new(DesktopServices::new(
        ctx.sessions.clone(),
        Arc::new(ctx.broker(Arc::new(ScriptedBrowser::new(reply)))),
        ctx.gateway.clone(),
        Arc::new(CaptureSubmitter::new(ctx.gateway.clone())),
        Arc::new(CaptureApi::new(ctx.gateway.clone())),
    ));

    let (client, server) = bridge_channel(8);
    tokio::spawn(server.run(services));
    client
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_sign_in_and_out_through_the_bridge(ctx: &TestContext) {
    let bridge = start_bridge(ctx, ProviderReply::Code(VALID_CODE));

    let response = bridge.request(BridgeRequest::Login).await.unwrap();
    let BridgeResponse::LoggedIn { user } = response else {
        panic!("expected LoggedIn, got {:?}", response);
    };
    assert_eq!(user.email, TEST_EMAIL);

    assert_eq!(
        bridge.request(BridgeRequest::AuthStatus).await.unwrap(),
        BridgeResponse::AuthStatus {
            authenticated: true
        }
    );

    assert_eq!(
        bridge.request(BridgeRequest::Logout).await.unwrap(),
        BridgeResponse::LoggedOut
    );
    assert_eq!(
        bridge.request(BridgeRequest::CurrentUser).await.unwrap(),
        BridgeResponse::CurrentUser { user: None }
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_flag_reauth_when_the_session_is_rejected(ctx: &TestContext) {
    ctx.sign_in(TEST_EMAIL).await;
    ctx.backend.reject_sessions();
    let bridge = start_bridge(ctx, ProviderReply::Silent);

    let payload = CapturePayload::new(WindowContext::now("Terminal", "zsh", None, "UTC"))
        .with_text_note("remember the milk");
    let response = bridge
        .request(BridgeRequest::SubmitCapture { payload })
        .await
        .unwrap();

    let BridgeResponse::Failed { error } = response else {
        panic!("expected Failed, got {:?}", response);
    };
    assert_eq!(error.kind, "session_expired");
    assert!(error.reauth_required);
    assert!(!ctx.sessions.is_authenticated().await.unwrap());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_submit_and_list_captures_through_the_bridge(ctx: &TestContext) {
    ctx.sign_in(TEST_EMAIL).await;
    let bridge = start_bridge(ctx, ProviderReply::Silent);

    let payload = CapturePayload::new(WindowContext::now("Terminal", "zsh", None, "UTC"))
        .with_text_note("remember the milk");
    assert_eq!(
        bridge
            .request(BridgeRequest::SubmitCapture { payload })
            .await
            .unwrap(),
        BridgeResponse::CaptureSubmitted {
            capture_id: "cap-1".to_string()
        }
    );

    let response = bridge
        .request(BridgeRequest::ListCaptures {
            kind: None,
            status: None,
            search: Some("standup".to_string()),
            oldest_first: false,
        })
        .await
        .unwrap();
    let BridgeResponse::Captures { captures } = response else {
        panic!("expected Captures, got {:?}", response);
    };
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].id, "c-2");

    assert_eq!(
        bridge
            .request(BridgeRequest::DeleteCapture {
                id: "c-2".to_string()
            })
            .await
            .unwrap(),
        BridgeResponse::CaptureDeleted {
            id: "c-2".to_string()
        }
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_the_current_user_only_while_signed_in(ctx: &TestContext) {
    let bridge = start_bridge(ctx, ProviderReply::Silent);
    assert_eq!(
        bridge.request(BridgeRequest::CurrentUser).await.unwrap(),
        BridgeResponse::CurrentUser { user: None }
    );

    ctx.sign_in(TEST_EMAIL).await;
    assert_eq!(
        bridge.request(BridgeRequest::CurrentUser).await.unwrap(),
        BridgeResponse::CurrentUser {
            user: Some(UserProfile::new(TEST_EMAIL))
        }
    );
}
