pub mod dto;

pub use dto::{LoginRequest, LoginResponse, LoginResult};

use crate::domain::session::AuthSessionManager;
use crate::error::{AppError, AppResult};
use reqwest::{multipart::Form, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

const LOGIN_PATH: &str = "/auth/login";
const HEALTH_PATH: &str = "/health";

/// Default whole-request budget for multipart uploads
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Body of an authenticated request
pub enum RequestBody {
    Json(JsonValue),
    Multipart(Form),
}

/// The only component that talks to the backend over the network.
///
/// Nothing here retries: a failed call is reported once and the caller
/// decides what to do.
pub struct BackendGateway {
    base_url: String,
    http_client: reqwest::Client,
    sessions: Arc<AuthSessionManager>,
    request_timeout: Duration,
    upload_timeout: Duration,
}

impl BackendGateway {
    pub fn new(
        base_url: impl Into<String>,
        sessions: Arc<AuthSessionManager>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpClient(e.to_string()))?;

        let mut gateway = Self::with_http_client(base_url, sessions, http_client);
        gateway.request_timeout = timeout;
        Ok(gateway)
    }

    /// Use a custom HTTP client
    pub fn with_http_client(
        base_url: impl Into<String>,
        sessions: Arc<AuthSessionManager>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            sessions,
            request_timeout: Duration::from_secs(30),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Budget for requests with a multipart body
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    fn timeout_for(&self, body: Option<&RequestBody>) -> Duration {
        match body {
            Some(RequestBody::Multipart(_)) => self.upload_timeout,
            _ => self.request_timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Exchange an authorization code for a backend session and persist it
    pub async fn exchange_code_for_session(&self, code: &str) -> AppResult<LoginResult> {
        let response = self
            .http_client
            .post(self.url(LOGIN_PATH))
            .timeout(self.request_timeout)
            .json(&LoginRequest {
                code: code.to_string(),
            })
            .send()
            .await
            .map_err(unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            tracing::warn!(status = status.as_u16(), detail = %detail, "Login rejected");
            return Err(AppError::LoginFailed(detail));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| AppError::InvalidResponse(format!("Failed to parse login response: {}", e)))?;

        self.sessions.save(&login.token, login.user.clone()).await?;

        tracing::info!(email = %login.user.email, "Login completed");
        Ok(login.into())
    }

    /// Authenticated request; returns the response only when it is 2xx.
    ///
    /// Fails with [`AppError::NotAuthenticated`] before touching the network
    /// when there is no live session. A 401 clears the session.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> AppResult<Response> {
        let token = self
            .sessions
            .get_token()
            .await?
            .ok_or(AppError::NotAuthenticated)?;

        let mut request = self
            .http_client
            .request(method.clone(), self.url(path))
            .timeout(self.timeout_for(body.as_ref()))
            .bearer_auth(token);

        request = match body {
            Some(RequestBody::Json(json)) => request.json(&json),
            Some(RequestBody::Multipart(form)) => request.multipart(form),
            None => request,
        };

        let response = request.send().await.map_err(unreachable)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(method = %method, path, "Backend rejected session, clearing it");
            self.sessions.clear().await?;
            return Err(AppError::SessionExpired);
        }

        if !status.is_success() {
            let detail = error_detail(response).await;
            tracing::warn!(
                method = %method,
                path,
                status = status.as_u16(),
                detail = %detail,
                "Backend request failed"
            );
            return Err(AppError::Backend {
                status: status.as_u16(),
                detail,
            });
        }

        tracing::debug!(method = %method, path, status = status.as_u16(), "Backend request succeeded");
        Ok(response)
    }

    /// Authenticated request decoding a JSON response
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> AppResult<T> {
        self.call(method, path, body)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AppError::InvalidResponse(format!("{}: {}", path, e)))
    }

    /// Unauthenticated health check
    pub async fn health(&self) -> AppResult<bool> {
        let response = self
            .http_client
            .get(self.url(HEALTH_PATH))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(unreachable)?;
        Ok(response.status().is_success())
    }
}

fn unreachable(e: reqwest::Error) -> AppError {
    tracing::error!(error = %e, "Backend did not respond");
    AppError::BackendUnreachable(e.to_string())
}

/// Best human-readable detail from an error response
async fn error_detail(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    detail_from_body(status, &text)
}

fn detail_from_body(status: StatusCode, text: &str) -> String {
    if let Ok(json) = serde_json::from_str::<JsonValue>(text) {
        match json.get("detail").or_else(|| json.get("message")) {
            Some(JsonValue::String(detail)) => return detail.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }

    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}
