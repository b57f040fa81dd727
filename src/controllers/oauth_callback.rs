use crate::domain::oauth::CallbackOutcome;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub state: Option<String>,
}

fn render_page(title: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>{title}</title>
  <meta charset="UTF-8">
  <style>
    body {{
      font-family: system-ui, -apple-system, sans-serif;
      display: flex;
      align-items: center;
      justify-content: center;
      min-height: 100vh;
      margin: 0;
      background: #f5f5f5;
    }}
    .container {{
      text-align: center;
      padding: 2rem;
      background: white;
      border-radius: 12px;
      box-shadow: 0 2px 8px rgba(0,0,0,0.1);
    }}
    h1 {{ color: #333; }}
    p {{ color: #666; }}
  </style>
</head>
<body>
  <div class="container">
    <h1>{title}</h1>
    <p>{message}</p>
  </div>
</body>
</html>"#,
        title = title,
        message = message
    )
}

pub fn success_page() -> String {
    render_page(
        "Signed in",
        "You can close this window and return to the app.",
    )
}

pub fn failure_page() -> String {
    render_page(
        "Sign-in failed",
        "Sign-in was not completed. Close this window and try again from the app.",
    )
}

fn invalid_request_page() -> String {
    render_page(
        "Invalid sign-in response",
        "This page expects a response from the sign-in provider.",
    )
}

/// Receives the provider redirect for one login attempt.
///
/// The first callback carrying `code` or `error` resolves the attempt; later
/// callbacks get a page but change nothing.
pub struct CallbackController {
    expected_state: String,
    outcome_tx: Mutex<Option<oneshot::Sender<CallbackOutcome>>>,
}

impl CallbackController {
    pub fn new(expected_state: String, outcome_tx: oneshot::Sender<CallbackOutcome>) -> Self {
        Self {
            expected_state,
            outcome_tx: Mutex::new(Some(outcome_tx)),
        }
    }

    /// GET <callback path> - OAuth redirect target
    pub async fn callback(
        State(controller): State<Arc<CallbackController>>,
        Query(params): Query<OAuthCallbackParams>,
    ) -> Response {
        if params.state.as_deref() != Some(controller.expected_state.as_str()) {
            tracing::warn!("OAuth callback with missing or mismatched state ignored");
            return (StatusCode::BAD_REQUEST, Html(invalid_request_page())).into_response();
        }

        let (outcome, page) = match (params.code, params.error) {
            (_, Some(error)) => (CallbackOutcome::Denied(error), failure_page()),
            (Some(code), None) if !code.is_empty() => (CallbackOutcome::Code(code), success_page()),
            _ => {
                tracing::warn!("OAuth callback without code or error ignored");
                return (StatusCode::BAD_REQUEST, Html(invalid_request_page())).into_response();
            }
        };

        match controller.outcome_tx.lock().await.take() {
            Some(tx) => {
                let denied = matches!(outcome, CallbackOutcome::Denied(_));
                if tx.send(outcome).is_err() {
                    tracing::warn!("OAuth callback arrived after the login attempt ended");
                } else {
                    tracing::info!(denied, "OAuth callback received");
                }
            }
            None => tracing::debug!("Duplicate OAuth callback ignored"),
        }

        Html(page).into_response()
    }
}

/// Router serving only the callback path
pub fn callback_router(callback_path: &str, controller: Arc<CallbackController>) -> Router {
    Router::new()
        .route(callback_path, get(CallbackController::callback))
        .with_state(controller)
        .layer(TraceLayer::new_for_http())
}

/// Callback routes for one login attempt, handed to the OAuth broker
pub fn callback_routes(
    callback_path: &str,
    expected_state: String,
    outcome_tx: oneshot::Sender<CallbackOutcome>,
) -> Router {
    callback_router(
        callback_path,
        Arc::new(CallbackController::new(expected_state, outcome_tx)),
    )
}
