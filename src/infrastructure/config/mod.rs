use crate::domain::oauth::{OAuthConfig, DEFAULT_AUTH_URL, DEFAULT_CALLBACK_PATH};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR_NAME: &str = "capture-desk";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub backend_url: String,
    pub http_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub data_dir: PathBuf,
    pub timezone: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Google OAuth
    pub oauth_client_id: String,
    pub oauth_auth_url: String,
    pub oauth_redirect_port: u16,
    pub oauth_callback_path: String,
    pub oauth_scopes: Vec<String>,
    pub oauth_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
                .trim_end_matches('/')
                .to_string(),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            upload_timeout_secs: env::var("UPLOAD_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
            timezone: env::var("TIMEZONE")
                .or_else(|_| env::var("TZ"))
                .unwrap_or_else(|_| "UTC".to_string()),
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            oauth_client_id: env::var("OAUTH_CLIENT_ID")?,
            oauth_auth_url: env::var("OAUTH_AUTH_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            oauth_redirect_port: env::var("OAUTH_REDIRECT_PORT")
                .unwrap_or_else(|_| "8085".to_string())
                .parse()?,
            oauth_callback_path: env::var("OAUTH_CALLBACK_PATH")
                .unwrap_or_else(|_| DEFAULT_CALLBACK_PATH.to_string()),
            oauth_scopes: env::var("OAUTH_SCOPES")
                .unwrap_or_else(|_| "openid email profile".to_string())
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            oauth_timeout_secs: env::var("OAUTH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Log filter used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_development() {
            "capture_desk=debug,tower_http=debug"
        } else {
            "capture_desk=info,tower_http=warn"
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Whole-request budget for capture uploads
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn oauth(&self) -> OAuthConfig {
        OAuthConfig {
            client_id: self.oauth_client_id.clone(),
            auth_url: self.oauth_auth_url.clone(),
            redirect_port: self.oauth_redirect_port,
            callback_path: self.oauth_callback_path.clone(),
            scopes: self.oauth_scopes.clone(),
            timeout: Duration::from_secs(self.oauth_timeout_secs),
        }
    }
}

/// Per-user application-data directory for the current platform
fn default_data_dir() -> PathBuf {
    let base = if cfg!(windows) {
        env::var("APPDATA").map(PathBuf::from).ok()
    } else if cfg!(target_os = "macos") {
        env::var("HOME")
            .map(|home| PathBuf::from(home).join("Library/Application Support"))
            .ok()
    } else {
        env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
            .ok()
    };

    base.unwrap_or_else(env::temp_dir).join(APP_DIR_NAME)
}
