use super::model::CaptureSummary;
use crate::error::AppResult;
use crate::infrastructure::http::BackendGateway;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

const CAPTURES_PATH: &str = "/api/captures";

/// The list endpoint has answered both as a bare array and wrapped
#[derive(Deserialize)]
#[serde(untagged)]
enum CaptureListResponse {
    Bare(Vec<CaptureSummary>),
    Wrapped { captures: Vec<CaptureSummary> },
}

/// Read and delete operations behind the dashboard views
pub struct CaptureApi {
    gateway: Arc<BackendGateway>,
}

impl CaptureApi {
    pub fn new(gateway: Arc<BackendGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list_captures(&self) -> AppResult<Vec<CaptureSummary>> {
        let response: CaptureListResponse = self
            .gateway
            .call_json(Method::GET, CAPTURES_PATH, None)
            .await?;

        let captures = match response {
            CaptureListResponse::Bare(captures) => captures,
            CaptureListResponse::Wrapped { captures } => captures,
        };
        tracing::debug!(count = captures.len(), "Captures listed");
        Ok(captures)
    }

    /// Full capture detail. Its schema belongs to the backend, so it is passed
    /// through untyped.
    pub async fn get_capture(&self, id: &str) -> AppResult<JsonValue> {
        let path = format!("{}/{}", CAPTURES_PATH, urlencoding::encode(id));
        self.gateway.call_json(Method::GET, &path, None).await
    }

    pub async fn delete_capture(&self, id: &str) -> AppResult<()> {
        let path = format!("{}/{}", CAPTURES_PATH, urlencoding::encode(id));
        self.gateway.call(Method::DELETE, &path, None).await?;
        tracing::info!(capture_id = %id, "Capture deleted");
        Ok(())
    }
}
