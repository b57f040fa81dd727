use super::model::{CapturePayload, CaptureReceipt};
use crate::error::{AppError, AppResult};
use crate::infrastructure::http::{BackendGateway, RequestBody};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;
use std::sync::Arc;

const CAPTURE_PATH: &str = "/api/capture";

/// Uploads one capture as a multipart request.
///
/// A failed upload is returned to the caller as-is. There is no retry and no
/// queue, because the payload carries no idempotency key.
pub struct CaptureSubmitter {
    gateway: Arc<BackendGateway>,
}

impl CaptureSubmitter {
    pub fn new(gateway: Arc<BackendGateway>) -> Self {
        Self { gateway }
    }

    pub async fn submit(&self, payload: CapturePayload) -> AppResult<CaptureReceipt> {
        if !payload.has_content() {
            return Err(AppError::EmptyCapture);
        }

        let form = build_form(&payload).await?;

        tracing::info!(
            app_name = %payload.window_context.app_name,
            has_screenshot = payload.screenshot_file.is_some(),
            has_audio = payload.audio_file.is_some(),
            has_text = payload.note().is_some(),
            "Submitting capture"
        );

        let receipt: CaptureReceipt = self
            .gateway
            .call_json(Method::POST, CAPTURE_PATH, Some(RequestBody::Multipart(form)))
            .await?;

        tracing::info!(capture_id = %receipt.id, "Capture accepted");
        Ok(receipt)
    }
}

async fn build_form(payload: &CapturePayload) -> AppResult<Form> {
    let mut form = Form::new();

    if let Some(path) = &payload.screenshot_file {
        form = form.part("screenshot_file", file_part(path).await?);
    }
    if let Some(path) = &payload.audio_file {
        form = form.part("audio_file", file_part(path).await?);
    }
    if let Some(note) = payload.note() {
        form = form.text("text_note", note.to_string());
    }

    let context = &payload.window_context;
    Ok(form
        .text("app_name", context.app_name.clone())
        .text("window_title", context.window_title.clone())
        .text("url", context.url.clone().unwrap_or_default())
        .text("timestamp", context.timestamp.clone())
        .text("timezone", context.timezone.clone()))
}

/// Part streaming the file from disk instead of reading it into memory
async fn file_part(path: &Path) -> AppResult<Part> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| capture_file_error(path, e.to_string()))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| capture_file_error(path, e.to_string()))?
        .len();

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string();

    Part::stream_with_length(reqwest::Body::from(file), length)
        .file_name(file_name)
        .mime_str(mime_for(path))
        .map_err(|e| capture_file_error(path, e.to_string()))
}

fn capture_file_error(path: &Path, message: String) -> AppError {
    AppError::CaptureFile {
        path: path.display().to_string(),
        message,
    }
}

pub fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("webm") => "audio/webm",
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        _ => "application/octet-stream",
    }
}
