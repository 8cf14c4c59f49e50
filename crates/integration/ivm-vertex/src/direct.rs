//! Direct Veo proxy
//!
//! Pass-through generation for clients that handle the video themselves:
//! nothing is written to disk and no script is drafted. A synchronous
//! Vertex `:predict` is tried first, then Generative Language
//! `:generateVideos`. Operations are polled on the Generative Language
//! host.

use crate::chain::{AttemptFailure, ChainOutcome, FallbackChain, Provider};
use crate::client::UpstreamClient;
use crate::kind::{VideoKind, ASPECT_RATIO, NEGATIVE_PROMPT, RESOLUTION};
use crate::providers::{transport, VideoRequest};
use crate::workflow::video_uri;
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    VertexPredict,
    GenerateVideos,
}

/// One way of asking a Veo model for a video.
struct DirectModel {
    client: UpstreamClient,
    name: String,
    model: String,
    route: Route,
}

impl DirectModel {
    fn new(client: UpstreamClient, model: &str, route: Route) -> Self {
        let action = match route {
            Route::VertexPredict => "predict",
            Route::GenerateVideos => "generateVideos",
        };
        Self {
            client,
            name: format!("{model}:{action}"),
            model: model.to_string(),
            route,
        }
    }
}

#[async_trait]
impl Provider for DirectModel {
    type Request = VideoRequest;
    type Output = Value;

    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, request: &VideoRequest) -> std::result::Result<Value, AttemptFailure> {
        let (url, body) = match self.route {
            Route::VertexPredict => (
                self.client.predict_sync_url(&self.model),
                json!({ "instances": [request] }),
            ),
            Route::GenerateVideos => (
                self.client.generate_videos_url(&self.model),
                json!({
                    "prompt": request.prompt,
                    "config": {
                        "negative_prompt": request.negative_prompt,
                        "aspect_ratio": request.aspect_ratio,
                        "resolution": request.resolution,
                        "duration_seconds": request.duration_seconds,
                    },
                }),
            ),
        };
        let url = url.map_err(|e| transport(&self.name, e))?;

        let response = self
            .client
            .post_json(url, &body)
            .await
            .map_err(|e| transport(&self.name, e))?;
        tracing::debug!(model = %self.name, status = response.status, "Direct video response");

        response.into_json(&self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum DirectOutcome {
    Processing {
        #[serde(skip_serializing_if = "Option::is_none")]
        operation_id: Option<String>,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    Completed {
        video_url: String,
    },
    #[serde(rename = "error")]
    Failed {
        error: String,
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        attempts: Vec<AttemptFailure>,
        #[serde(skip)]
        http_status: u16,
    },
}

impl DirectOutcome {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Failed { http_status, .. } => *http_status,
            _ => 200,
        }
    }
}

#[derive(Clone)]
pub struct DirectVideoProxy {
    client: UpstreamClient,
}

impl DirectVideoProxy {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    fn chain(&self) -> Option<FallbackChain<DirectModel>> {
        let model = self.client.vertex().video_models.first()?;
        Some(FallbackChain::new(vec![
            DirectModel::new(self.client.clone(), model, Route::VertexPredict),
            DirectModel::new(self.client.clone(), model, Route::GenerateVideos),
        ]))
    }

    pub async fn generate(&self, prompt: Option<String>) -> DirectOutcome {
        let kind = VideoKind::Showcase;
        let Some(chain) = self.chain() else {
            return DirectOutcome::Failed {
                error: "No video generation models are configured".to_string(),
                message: "Configure vertex.video_models to enable video generation.".to_string(),
                attempts: Vec::new(),
                http_status: 503,
            };
        };

        let request = VideoRequest {
            prompt: prompt
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| kind.prompt().to_string()),
            negative_prompt: NEGATIVE_PROMPT.to_string(),
            aspect_ratio: ASPECT_RATIO.to_string(),
            resolution: RESOLUTION.to_string(),
            duration_seconds: kind.duration_secs(),
        };

        match chain.run(&request).await {
            ChainOutcome::Success { output, .. } => accepted(output),
            ChainOutcome::Exhausted { failures } => {
                let error = failures
                    .last()
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "no response".to_string());
                DirectOutcome::Failed {
                    error,
                    message: "Veo API may require special access or additional setup.".to_string(),
                    attempts: failures,
                    http_status: 503,
                }
            }
        }
    }

    pub async fn poll(&self, operation_id: &str) -> Result<DirectOutcome> {
        let url = self.client.generative_operation_url(operation_id)?;

        let response = match self.client.get(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Direct poll failed: {}", e);
                return Ok(DirectOutcome::Failed {
                    error: e.to_string(),
                    message: "Could not reach the video API.".to_string(),
                    attempts: Vec::new(),
                    http_status: 502,
                });
            }
        };

        if !response.is_success() {
            tracing::debug!(status = response.status, "Direct poll not ready");
            return Ok(processing("Still processing..."));
        }

        let data: Value = match serde_json::from_str(&response.body) {
            Ok(data) => data,
            Err(_) => return Ok(processing("Still processing...")),
        };

        let done = data.get("done").and_then(Value::as_bool).unwrap_or(false);
        if done {
            if let Some(uri) = data.get("response").and_then(video_uri) {
                return Ok(DirectOutcome::Completed {
                    video_url: uri.to_string(),
                });
            }
        }
        Ok(processing("Video generation in progress..."))
    }
}

fn processing(message: &str) -> DirectOutcome {
    DirectOutcome::Processing {
        operation_id: None,
        message: message.to_string(),
        data: None,
    }
}

fn accepted(data: Value) -> DirectOutcome {
    let operation_name = data
        .pointer("/operation/name")
        .or_else(|| data.get("name"))
        .and_then(Value::as_str);
    if let Some(name) = operation_name {
        return DirectOutcome::Processing {
            operation_id: Some(name.to_string()),
            message: "Video generation in progress. Please check back shortly.".to_string(),
            data: None,
        };
    }

    let ready = data
        .get("videoUrl")
        .or_else(|| data.get("video"))
        .and_then(Value::as_str);
    if let Some(url) = ready {
        return DirectOutcome::Completed {
            video_url: url.to_string(),
        };
    }

    DirectOutcome::Processing {
        operation_id: None,
        message: "Video generation initiated.".to_string(),
        data: Some(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_shapes() {
        let op = accepted(json!({"operation": {"name": "operations/abc"}}));
        assert!(matches!(
            op,
            DirectOutcome::Processing { operation_id: Some(ref id), .. } if id == "operations/abc"
        ));

        let ready = serde_json::to_value(accepted(json!({"video": "https://cdn/v.mp4"}))).unwrap();
        assert_eq!(ready, json!({"status": "completed", "videoUrl": "https://cdn/v.mp4"}));

        let other = serde_json::to_value(accepted(json!({"predictions": []}))).unwrap();
        assert_eq!(other["status"], "processing");
        assert_eq!(other["data"]["predictions"], json!([]));
    }

    #[test]
    fn test_failed_hides_http_status() {
        let failed = DirectOutcome::Failed {
            error: "e".into(),
            message: "m".into(),
            attempts: Vec::new(),
            http_status: 502,
        };
        assert_eq!(failed.http_status(), 502);
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json, json!({"status": "error", "error": "e", "message": "m"}));
    }

    #[test]
    fn test_route_names() {
        let client = UpstreamClient::new(&ivm_config::ShowroomConfig::default()).unwrap();
        let proxy = DirectVideoProxy::new(client);
        let names: Vec<_> = proxy
            .chain()
            .unwrap()
            .providers()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(
            names,
            ["veo-3.1-generate-preview:predict", "veo-3.1-generate-preview:generateVideos"]
        );
    }
}
