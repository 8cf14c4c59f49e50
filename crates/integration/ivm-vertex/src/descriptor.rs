//! Operation descriptor: local record of an in-flight generation request

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub const STATUS_PROCESSING: &str = "processing";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescriptor {
    pub operation_id: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_data: Option<Value>,
}

impl OperationDescriptor {
    pub fn processing(operation_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            prompt: prompt.into(),
            created_at: Utc::now(),
            status: STATUS_PROCESSING.to_string(),
            project_id: None,
            region: None,
            response_data: None,
        }
    }

    pub fn with_location(mut self, project_id: &str, region: &str) -> Self {
        self.project_id = Some(project_id.to_string());
        self.region = Some(region.to_string());
        self
    }

    pub fn with_response_data(mut self, data: Value) -> Self {
        self.response_data = Some(data);
        self
    }

    /// Overwrites any previous descriptor.
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// `None` when the file is missing or unreadable.
    pub async fn read(path: &Path) -> Option<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                tracing::warn!("Ignoring malformed descriptor {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Missing files are not an error.
    pub async fn remove(path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
