use serde::{Deserialize, Serialize};

use crate::infrastructure::store::StoreError;

/// Main client error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Loopback port {0} is already in use")]
    PortInUse(u16),

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Authorization timed out")]
    AuthorizationTimeout,

    #[error("Failed to open browser: {0}")]
    BrowserLaunch(String),

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Capture has no screenshot, audio or text note")]
    EmptyCapture,

    #[error("Backend error ({status}): {detail}")]
    Backend { status: u16, detail: String },

    #[error("Capture file {path} unreadable: {message}")]
    CaptureFile { path: String, message: String },

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Desktop bridge closed")]
    BridgeClosed,
}

/// Error shape handed across the desktop bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
    pub reauth_required: bool,
}

impl AppError {
    /// Stable snake_case name for the error class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "malformed_token",
            Self::PortInUse(_) => "port_in_use",
            Self::AuthorizationDenied(_) => "authorization_denied",
            Self::AuthorizationTimeout => "authorization_timeout",
            Self::BrowserLaunch(_) => "browser_launch",
            Self::LoginFailed(_) => "login_failed",
            Self::BackendUnreachable(_) => "backend_unreachable",
            Self::HttpClient(_) => "http_client",
            Self::NotAuthenticated => "not_authenticated",
            Self::SessionExpired => "session_expired",
            Self::EmptyCapture => "empty_capture",
            Self::Backend { .. } => "backend_error",
            Self::CaptureFile { .. } => "capture_file",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Storage(_) => "storage",
            Self::Io(_) => "io",
            Self::BridgeClosed => "bridge_closed",
        }
    }

    /// Session errors all send the user back to the login screen
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::SessionExpired)
    }

    /// Message suitable for showing next to a retry action
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated | Self::SessionExpired => {
                "Your session has ended. Please sign in again.".to_string()
            }
            Self::BackendUnreachable(_) => {
                "The server is not reachable. Check that the backend is running and try again."
                    .to_string()
            }
            Self::PortInUse(port) => format!(
                "Sign-in could not start because port {} is busy. Close the other app and retry.",
                port
            ),
            Self::AuthorizationTimeout => "Sign-in timed out. Please try again.".to_string(),
            Self::AuthorizationDenied(reason) => format!("Sign-in was cancelled ({}).", reason),
            Self::LoginFailed(detail) => format!("Sign-in failed: {}", detail),
            Self::Backend { detail, .. } => detail.clone(),
            _ => self.to_string(),
        }
    }

    /// Convert to the bridge error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            kind: self.kind().to_string(),
            message: self.user_message(),
            reauth_required: self.requires_reauth(),
        }
    }
}

/// Custom result type for the client
pub type AppResult<T> = Result<T, AppError>;
