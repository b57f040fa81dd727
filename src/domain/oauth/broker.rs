use super::state::{CallbackOutcome, OAuthFlowState};
use crate::error::{AppError, AppResult};
use crate::infrastructure::browser::BrowserLauncher;
use axum::Router;
use std::io::{self, ErrorKind};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_REDIRECT_PORT: u16 = 8085;
pub const DEFAULT_CALLBACK_PATH: &str = "/oauth2callback";
pub const DEFAULT_FLOW_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const LISTENER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the loopback router for one attempt from the callback path, the
/// expected `state` and the sender that resolves the attempt.
pub type CallbackRoutes = fn(&str, String, oneshot::Sender<CallbackOutcome>) -> Router;

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub auth_url: String,
    pub redirect_port: u16,
    pub callback_path: String,
    pub scopes: Vec<String>,
    pub timeout: Duration,
}

impl OAuthConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            redirect_port: DEFAULT_REDIRECT_PORT,
            callback_path: DEFAULT_CALLBACK_PATH.to_string(),
            scopes: vec!["openid".into(), "email".into(), "profile".into()],
            timeout: DEFAULT_FLOW_TIMEOUT,
        }
    }

    /// Redirect URI for a listener bound on `port`
    pub fn redirect_uri(&self, port: u16) -> String {
        format!("http://127.0.0.1:{}{}", port, self.callback_path)
    }
}

/// Short-lived HTTP server bound to the loopback interface.
///
/// `close` signals a graceful shutdown and waits for the server task, so the
/// port can be bound again once it returns. Closing twice is a no-op; dropping
/// an open listener still signals shutdown.
pub struct LoopbackListener {
    port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl LoopbackListener {
    pub async fn bind(port: u16, router: Router) -> AppResult<Self> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AddrInUse => AppError::PortInUse(port),
                _ => AppError::Io(e),
            })?;
        let port = listener.local_addr()?.port();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "Loopback listener failed");
            }
        });

        tracing::info!(port, "Loopback listener started");

        Ok(Self {
            port,
            shutdown_tx: Some(shutdown_tx),
            server: Some(server),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn close(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        let Some(mut server) = self.server.take() else {
            return;
        };

        if tokio::time::timeout(LISTENER_DRAIN_TIMEOUT, &mut server)
            .await
            .is_err()
        {
            tracing::warn!(port = self.port, "Loopback listener did not drain, aborting");
            server.abort();
            let _ = server.await;
        }

        tracing::info!(port = self.port, "Loopback listener closed");
    }
}

impl Drop for LoopbackListener {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Drives the browser consent screen and collects the authorization code
pub struct OAuthBroker {
    config: OAuthConfig,
    launcher: Arc<dyn BrowserLauncher>,
    routes: CallbackRoutes,
}

impl OAuthBroker {
    pub fn new(
        config: OAuthConfig,
        launcher: Arc<dyn BrowserLauncher>,
        routes: CallbackRoutes,
    ) -> Self {
        Self {
            config,
            launcher,
            routes,
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Consent URL for one attempt, percent-encoding every parameter
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        let scope = self.config.scopes.join(" ");
        let params = [
            ("response_type", "code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ];
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.config.auth_url, query)
    }

    /// Run one login attempt and return the single-use authorization code
    pub async fn start_oauth_flow(&self) -> AppResult<String> {
        let mut flow = OAuthFlowState::Idle;
        let state = Uuid::new_v4().to_string();
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let router = (self.routes)(&self.config.callback_path, state.clone(), outcome_tx);

        let mut listener = LoopbackListener::bind(self.config.redirect_port, router).await?;
        flow = flow.advance(OAuthFlowState::ServerListening);

        let redirect_uri = self.config.redirect_uri(listener.port());
        let url = self.authorization_url(&redirect_uri, &state);

        if let Err(e) = self.launcher.open(&url) {
            tracing::error!(error = %e, "Could not open the consent page");
            listener.close().await;
            flow.advance(OAuthFlowState::Closed);
            return Err(AppError::BrowserLaunch(e.to_string()));
        }
        flow = flow.advance(OAuthFlowState::AwaitingCallback);

        let result = match tokio::time::timeout(self.config.timeout, outcome_rx).await {
            Ok(Ok(CallbackOutcome::Code(code))) => {
                flow = flow.advance(OAuthFlowState::CodeReceived);
                Ok(code)
            }
            Ok(Ok(CallbackOutcome::Denied(error))) => {
                flow = flow.advance(OAuthFlowState::ErrorReceived);
                Err(AppError::AuthorizationDenied(error))
            }
            Ok(Err(_)) => {
                tracing::error!("Loopback listener dropped the callback channel");
                flow = flow.advance(OAuthFlowState::ErrorReceived);
                Err(AppError::Io(io::Error::new(
                    ErrorKind::BrokenPipe,
                    "loopback listener stopped before the provider answered",
                )))
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.config.timeout.as_secs(),
                    "OAuth flow timed out"
                );
                flow = flow.advance(OAuthFlowState::TimedOut);
                Err(AppError::AuthorizationTimeout)
            }
        };

        listener.close().await;
        flow.advance(OAuthFlowState::Closed);

        result
    }
}
