use crate::domain::capture::{
    CaptureApi, CaptureKind, CapturePayload, CaptureReceipt, CaptureStatus, CaptureSubmitter,
    CaptureSummary, InboxQuery, SortOrder,
};
use crate::domain::oauth::OAuthBroker;
use crate::domain::session::{AuthSessionManager, UserProfile};
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::infrastructure::http::BackendGateway;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Requests the UI process may send. Each one gets exactly one
/// [`BridgeResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeRequest {
    Login,
    Logout,
    CurrentUser,
    AuthStatus,
    SubmitCapture {
        payload: CapturePayload,
    },
    ListCaptures {
        #[serde(default)]
        kind: Option<CaptureKind>,
        #[serde(default)]
        status: Option<CaptureStatus>,
        #[serde(default)]
        search: Option<String>,
        #[serde(default)]
        oldest_first: bool,
    },
    CaptureDetail {
        id: String,
    },
    DeleteCapture {
        id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeResponse {
    LoggedIn { user: UserProfile },
    LoggedOut,
    CurrentUser { user: Option<UserProfile> },
    AuthStatus { authenticated: bool },
    CaptureSubmitted { capture_id: String },
    Captures { captures: Vec<CaptureSummary> },
    CaptureDetail { capture: JsonValue },
    CaptureDeleted { id: String },
    Failed { error: ErrorResponse },
}

/// Everything the UI process is allowed to ask of the client core
#[async_trait]
pub trait DesktopCapabilities: Send + Sync {
    async fn login(&self) -> AppResult<UserProfile>;

    async fn logout(&self) -> AppResult<()>;

    async fn current_user(&self) -> AppResult<Option<UserProfile>>;

    async fn auth_status(&self) -> AppResult<bool>;

    async fn submit_capture(&self, payload: CapturePayload) -> AppResult<CaptureReceipt>;

    async fn list_captures(&self, query: InboxQuery) -> AppResult<Vec<CaptureSummary>>;

    async fn capture_detail(&self, id: &str) -> AppResult<JsonValue>;

    async fn delete_capture(&self, id: &str) -> AppResult<()>;
}

/// Capabilities backed by the real session, OAuth and backend components
pub struct DesktopServices {
    sessions: Arc<AuthSessionManager>,
    broker: Arc<OAuthBroker>,
    gateway: Arc<BackendGateway>,
    submitter: Arc<CaptureSubmitter>,
    captures: Arc<CaptureApi>,
}

impl DesktopServices {
    pub fn new(
        sessions: Arc<AuthSessionManager>,
        broker: Arc<OAuthBroker>,
        gateway: Arc<BackendGateway>,
        submitter: Arc<CaptureSubmitter>,
        captures: Arc<CaptureApi>,
    ) -> Self {
        Self {
            sessions,
            broker,
            gateway,
            submitter,
            captures,
        }
    }
}

#[async_trait]
impl DesktopCapabilities for DesktopServices {
    async fn login(&self) -> AppResult<UserProfile> {
        let code = self.broker.start_oauth_flow().await?;
        let login = self.gateway.exchange_code_for_session(&code).await?;
        Ok(login.user)
    }

    async fn logout(&self) -> AppResult<()> {
        self.sessions.clear().await?;
        tracing::info!("Logged out");
        Ok(())
    }

    async fn current_user(&self) -> AppResult<Option<UserProfile>> {
        Ok(self.sessions.get_session().await?.map(|session| session.user))
    }

    async fn auth_status(&self) -> AppResult<bool> {
        self.sessions.is_authenticated().await
    }

    async fn submit_capture(&self, payload: CapturePayload) -> AppResult<CaptureReceipt> {
        self.submitter.submit(payload).await
    }

    async fn list_captures(&self, query: InboxQuery) -> AppResult<Vec<CaptureSummary>> {
        let captures = self.captures.list_captures().await?;
        Ok(query.apply(&captures))
    }

    async fn capture_detail(&self, id: &str) -> AppResult<JsonValue> {
        self.captures.get_capture(id).await
    }

    async fn delete_capture(&self, id: &str) -> AppResult<()> {
        self.captures.delete_capture(id).await
    }
}

/// Run one request against the capabilities, folding errors into the response
pub async fn dispatch(
    capabilities: &dyn DesktopCapabilities,
    request: BridgeRequest,
) -> BridgeResponse {
    let result = match request {
        BridgeRequest::Login => capabilities
            .login()
            .await
            .map(|user| BridgeResponse::LoggedIn { user }),
        BridgeRequest::Logout => capabilities
            .logout()
            .await
            .map(|_| BridgeResponse::LoggedOut),
        BridgeRequest::CurrentUser => capabilities
            .current_user()
            .await
            .map(|user| BridgeResponse::CurrentUser { user }),
        BridgeRequest::AuthStatus => capabilities
            .auth_status()
            .await
            .map(|authenticated| BridgeResponse::AuthStatus { authenticated }),
        BridgeRequest::SubmitCapture { payload } => capabilities
            .submit_capture(payload)
            .await
            .map(|receipt| BridgeResponse::CaptureSubmitted {
                capture_id: receipt.id,
            }),
        BridgeRequest::ListCaptures {
            kind,
            status,
            search,
            oldest_first,
        } => {
            let query = InboxQuery {
                kind,
                status,
                search,
                sort: if oldest_first {
                    SortOrder::OldestFirst
                } else {
                    SortOrder::NewestFirst
                },
            };
            capabilities
                .list_captures(query)
                .await
                .map(|captures| BridgeResponse::Captures { captures })
        }
        BridgeRequest::CaptureDetail { id } => capabilities
            .capture_detail(&id)
            .await
            .map(|capture| BridgeResponse::CaptureDetail { capture }),
        BridgeRequest::DeleteCapture { id } => capabilities
            .delete_capture(&id)
            .await
            .map(|_| BridgeResponse::CaptureDeleted { id }),
    };

    result.unwrap_or_else(|err| {
        tracing::warn!(kind = err.kind(), error = %err, "Bridge request failed");
        BridgeResponse::Failed {
            error: err.to_response(),
        }
    })
}

type Envelope = (BridgeRequest, oneshot::Sender<BridgeResponse>);

/// Create a connected client/server pair
pub fn bridge_channel(capacity: usize) -> (BridgeClient, BridgeServer) {
    let (tx, rx) = mpsc::channel(capacity);
    (BridgeClient { tx }, BridgeServer { rx })
}

/// UI-side handle. Every request carries its own reply channel.
#[derive(Clone)]
pub struct BridgeClient {
    tx: mpsc::Sender<Envelope>,
}

impl BridgeClient {
    pub async fn request(&self, request: BridgeRequest) -> AppResult<BridgeResponse> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((request, reply_tx))
            .await
            .map_err(|_| AppError::BridgeClosed)?;
        reply_rx.await.map_err(|_| AppError::BridgeClosed)
    }
}

/// Core-side end of the bridge
pub struct BridgeServer {
    rx: mpsc::Receiver<Envelope>,
}

impl BridgeServer {
    /// Serve requests until every client is dropped. Requests run
    /// concurrently so a pending login does not hold up other calls.
    pub async fn run(mut self, capabilities: Arc<dyn DesktopCapabilities>) {
        while let Some((request, reply_tx)) = self.rx.recv().await {
            let capabilities = capabilities.clone();
            tokio::spawn(async move {
                let response = dispatch(capabilities.as_ref(), request).await;
                if reply_tx.send(response).is_err() {
                    tracing::debug!("Bridge requester went away before the reply");
                }
            });
        }
        tracing::debug!("Bridge closed");
    }
}
