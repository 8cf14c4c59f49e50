//! Concrete providers for the fallback chain

use crate::chain::{AttemptFailure, FailureKind, Provider};
use crate::client::UpstreamClient;
pub use crate::client::ApiVersion;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

/// One `predictLongRunning` instance.
#[derive(Debug, Clone, Serialize)]
pub struct VideoRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub aspect_ratio: String,
    pub resolution: String,
    pub duration_seconds: u32,
}

#[derive(Debug, Clone)]
pub struct TextRequest {
    pub text: String,
}

impl TextRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Veo model behind Vertex AI `predictLongRunning`.
pub struct VeoModel {
    client: UpstreamClient,
    model: String,
}

impl VeoModel {
    pub fn new(client: UpstreamClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Provider for VeoModel {
    type Request = VideoRequest;
    type Output = Value;

    fn name(&self) -> &str {
        &self.model
    }

    async fn attempt(&self, request: &VideoRequest) -> Result<Value, AttemptFailure> {
        let url = self
            .client
            .predict_url(&self.model)
            .map_err(|e| transport(&self.model, e))?;
        let body = json!({ "instances": [request] });

        let response = self
            .client
            .post_json(url, &body)
            .await
            .map_err(|e| transport(&self.model, e))?;
        tracing::debug!(model = %self.model, status = response.status, "Vertex response");

        response.into_json(&self.model)
    }
}

/// Gemini model behind `generateContent`; yields the first candidate's text.
pub struct TextModel {
    client: UpstreamClient,
    model: String,
    version: ApiVersion,
}

impl TextModel {
    pub fn new(client: UpstreamClient, model: impl Into<String>, version: ApiVersion) -> Self {
        Self {
            client,
            model: model.into(),
            version,
        }
    }
}

#[async_trait]
impl Provider for TextModel {
    type Request = TextRequest;
    type Output = String;

    fn name(&self) -> &str {
        &self.model
    }

    async fn attempt(&self, request: &TextRequest) -> Result<String, AttemptFailure> {
        let url = self
            .client
            .generate_content_url(self.version, &self.model)
            .map_err(|e| transport(&self.model, e))?;
        let body = json!({ "contents": [{ "parts": [{ "text": request.text }] }] });

        let response = self
            .client
            .post_json(url, &body)
            .await
            .map_err(|e| transport(&self.model, e))?;
        let data = response.into_json(&self.model)?;

        match candidate_text(&data) {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(AttemptFailure::new(&self.model, FailureKind::Empty)),
        }
    }
}

/// `candidates[0].content.parts[0].text`
pub fn candidate_text(data: &Value) -> Option<&str> {
    data.pointer("/candidates/0/content/parts/0/text")?.as_str()
}

pub(crate) fn transport(model: &str, error: impl std::fmt::Display) -> AttemptFailure {
    AttemptFailure::new(
        model,
        FailureKind::Transport {
            message: error.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_request_wire_shape() {
        let request = VideoRequest {
            prompt: "p".into(),
            negative_prompt: "n".into(),
            aspect_ratio: "16:9".into(),
            resolution: "1080p".into(),
            duration_seconds: 8,
        };
        let body = json!({ "instances": [request] });
        assert_eq!(body["instances"][0]["duration_seconds"], 8);
        assert_eq!(body["instances"][0]["negative_prompt"], "n");
    }

    #[test]
    fn test_candidate_text() {
        let data = json!({"candidates": [{"content": {"parts": [{"text": "Hello"}]}}]});
        assert_eq!(candidate_text(&data), Some("Hello"));
        assert_eq!(candidate_text(&json!({"candidates": []})), None);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        let mut config = ivm_config::ShowroomConfig::default();
        config.generative.endpoint = "http://127.0.0.1:1".into();
        let client = UpstreamClient::new(&config).unwrap();

        let failure = TextModel::new(client, "gemini-pro", ApiVersion::V1)
            .attempt(&TextRequest::new("hi"))
            .await
            .unwrap_err();
        assert_eq!(failure.provider, "gemini-pro");
        assert!(matches!(failure.kind, FailureKind::Transport { .. }));
    }
}
