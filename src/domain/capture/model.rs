use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the user was when the capture was taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowContext {
    pub app_name: String,
    pub window_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// ISO-8601 / RFC 3339 timestamp
    pub timestamp: String,
    /// IANA zone name, e.g. `Europe/Madrid`
    pub timezone: String,
}

impl WindowContext {
    /// Context stamped with the current time
    pub fn now(
        app_name: impl Into<String>,
        window_title: impl Into<String>,
        url: Option<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self::at(Utc::now(), app_name, window_title, url, timezone)
    }

    pub fn at(
        time: DateTime<Utc>,
        app_name: impl Into<String>,
        window_title: impl Into<String>,
        url: Option<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            window_title: window_title.into(),
            url,
            timestamp: time.to_rfc3339_opts(SecondsFormat::Millis, true),
            timezone: timezone.into(),
        }
    }
}

/// One capture event on its way to the backend.
///
/// Files are referenced by path and streamed at submit time. At least one of
/// screenshot, audio or a non-blank text note must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_note: Option<String>,
    pub window_context: WindowContext,
}

impl CapturePayload {
    pub fn new(window_context: WindowContext) -> Self {
        Self {
            screenshot_file: None,
            audio_file: None,
            text_note: None,
            window_context,
        }
    }

    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot_file = Some(path.into());
        self
    }

    pub fn with_audio(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio_file = Some(path.into());
        self
    }

    pub fn with_text_note(mut self, note: impl Into<String>) -> Self {
        self.text_note = Some(note.into());
        self
    }

    /// Text note, unless it is blank
    pub fn note(&self) -> Option<&str> {
        self.text_note
            .as_deref()
            .filter(|note| !note.trim().is_empty())
    }

    pub fn has_content(&self) -> bool {
        self.screenshot_file.is_some() || self.audio_file.is_some() || self.note().is_some()
    }
}

/// Backend acknowledgement of a submitted capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureReceipt {
    #[serde(alias = "capture_id")]
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Screenshot,
    Audio,
    Text,
}

impl std::fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureKind::Screenshot => write!(f, "screenshot"),
            CaptureKind::Audio => write!(f, "audio"),
            CaptureKind::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for CaptureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "screenshot" => Ok(CaptureKind::Screenshot),
            "audio" => Ok(CaptureKind::Audio),
            "text" => Ok(CaptureKind::Text),
            other => Err(format!("unknown capture kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureStatus::Pending => write!(f, "pending"),
            CaptureStatus::Processing => write!(f, "processing"),
            CaptureStatus::Completed => write!(f, "completed"),
            CaptureStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for CaptureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(CaptureStatus::Pending),
            "processing" => Ok(CaptureStatus::Processing),
            "completed" => Ok(CaptureStatus::Completed),
            "failed" => Ok(CaptureStatus::Failed),
            other => Err(format!("unknown capture status: {}", other)),
        }
    }
}

/// One row of the capture inbox as listed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub id: String,
    pub kind: CaptureKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub status: CaptureStatus,
    pub created_at: DateTime<Utc>,
}
