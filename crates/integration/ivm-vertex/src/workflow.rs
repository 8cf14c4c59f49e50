//! Video Workflow
//!
//! Generate and poll for one video kind. Outcomes serialize directly into
//! the JSON bodies the web layer returns; `http_status` gives the code.

use crate::asset::{AssetStatus, CachedAsset};
use crate::chain::{AttemptFailure, ChainOutcome, FailureKind, FallbackChain};
use crate::client::{ApiVersion, UpstreamClient};
use crate::descriptor::OperationDescriptor;
use crate::kind::{VideoKind, ASPECT_RATIO, NEGATIVE_PROMPT, RESOLUTION};
use crate::providers::{TextModel, TextRequest, VeoModel, VideoRequest};
use crate::{scripts, sniff, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const PROCESSING_NOTE: &str = "This may take 5-10 minutes. Please wait...";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unavailable {
    pub error: String,
    pub message: String,
    pub solution: String,
    pub video_script: String,
    pub script_path: String,
    pub instructions: Vec<String>,
    pub alternative_options: Vec<String>,
    /// What each model answered, in order
    pub attempts: Vec<AttemptFailure>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum GenerateOutcome {
    Exists {
        message: String,
        video_url: String,
        path: PathBuf,
        size: u64,
        created: chrono::DateTime<chrono::Utc>,
    },
    Completed {
        message: String,
        video_url: String,
        path: PathBuf,
        size: u64,
    },
    Processing {
        operation_id: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    #[serde(rename = "error")]
    Unavailable(Box<Unavailable>),
}

impl GenerateOutcome {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unavailable(_) => 503,
            _ => 200,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum PollOutcome {
    Processing {
        message: String,
        progress: Option<Value>,
    },
    Completed {
        video_url: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
    },
    /// The operation finished with an error
    #[serde(rename = "error")]
    Failed { error: String, details: Value },
    /// Upstream unreachable and no matching descriptor
    #[serde(rename = "error")]
    NotFound { error: String },
    /// The video exists upstream but could not be fetched
    #[serde(rename = "error")]
    DownloadFailed { error: String, message: String },
}

impl PollOutcome {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Processing { .. } | Self::Completed { .. } => 200,
            Self::Failed { .. } => 500,
            Self::NotFound { .. } => 404,
            Self::DownloadFailed { .. } => 502,
        }
    }
}

/// What an accepted generation request turned into.
enum Accepted {
    Outcome(GenerateOutcome),
    /// The model answered with a video URL that could not be fetched
    DownloadFailed(String),
}

#[derive(Clone)]
pub struct VideoWorkflow {
    client: UpstreamClient,
    videos_dir: PathBuf,
}

impl VideoWorkflow {
    pub fn new(client: UpstreamClient, videos_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            videos_dir: videos_dir.into(),
        }
    }

    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }

    pub fn asset(&self, kind: VideoKind) -> CachedAsset {
        CachedAsset::new(&self.videos_dir, kind)
    }

    pub async fn status(&self, kind: VideoKind) -> Result<AssetStatus> {
        let asset = self.asset(kind);
        let info = asset.probe().await?;
        Ok(AssetStatus::from_probe(&asset, info))
    }

    pub async fn generate(&self, kind: VideoKind, prompt: Option<String>) -> Result<GenerateOutcome> {
        tokio::fs::create_dir_all(&self.videos_dir).await?;

        let asset = self.asset(kind);
        if let Some(info) = asset.probe().await? {
            return Ok(GenerateOutcome::Exists {
                message: format!("{} already exists", kind.label()),
                video_url: asset.public_url(),
                path: info.path,
                size: info.size,
                created: info.created,
            });
        }

        let prompt = prompt
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| kind.prompt().to_string());
        tracing::info!(%kind, "Starting video generation");
        tracing::debug!(%kind, "Prompt: {}", prompt);

        let script = self.draft_script(kind, &prompt).await;
        let script_path = kind.script_path(&self.videos_dir);
        tokio::fs::write(&script_path, &script).await?;
        tracing::info!(%kind, "Video script saved to {}", script_path.display());

        let vertex = self.client.vertex();
        tracing::info!(
            project = %vertex.project_id,
            region = %vertex.region,
            "Requesting video from {} model(s)",
            vertex.video_models.len()
        );
        let chain = FallbackChain::new(
            vertex
                .video_models
                .iter()
                .map(|model| VeoModel::new(self.client.clone(), model.as_str()))
                .collect(),
        );
        let request = VideoRequest {
            prompt: prompt.clone(),
            negative_prompt: NEGATIVE_PROMPT.to_string(),
            aspect_ratio: ASPECT_RATIO.to_string(),
            resolution: RESOLUTION.to_string(),
            duration_seconds: kind.duration_secs(),
        };

        match chain.run(&request).await {
            ChainOutcome::Success {
                provider,
                output,
                mut failures,
            } => match self.accept(kind, &prompt, output, &asset).await? {
                Accepted::Outcome(outcome) => Ok(outcome),
                Accepted::DownloadFailed(message) => {
                    tracing::warn!(%kind, "Generated video could not be downloaded: {}", message);
                    failures.push(AttemptFailure::new(provider, FailureKind::Download { message }));
                    Ok(GenerateOutcome::Unavailable(Box::new(unavailable(
                        kind, script, failures,
                    ))))
                }
            },
            ChainOutcome::Exhausted { failures } => {
                tracing::warn!(%kind, "No video model accepted the request");
                Ok(GenerateOutcome::Unavailable(Box::new(unavailable(
                    kind, script, failures,
                ))))
            }
        }
    }

    /// Text model first, static template when it fails or returns nothing.
    async fn draft_script(&self, kind: VideoKind, prompt: &str) -> String {
        let generative = self.client.generative();
        let chain = FallbackChain::new(vec![TextModel::new(
            self.client.clone(),
            generative.script_model.as_str(),
            ApiVersion::V1,
        )]);

        match chain.run(&TextRequest::new(scripts::script_request(prompt))).await {
            ChainOutcome::Success { output, .. } => {
                tracing::info!(%kind, "Video script generated");
                output
            }
            ChainOutcome::Exhausted { .. } => {
                tracing::info!(%kind, "Script model unavailable, using template");
                kind.fallback_script(prompt)
            }
        }
    }

    async fn accept(
        &self,
        kind: VideoKind,
        prompt: &str,
        data: Value,
        asset: &CachedAsset,
    ) -> Result<Accepted> {
        let descriptor_path = kind.operation_path(&self.videos_dir);

        let operation_name = data
            .get("name")
            .and_then(Value::as_str)
            .or_else(|| data.pointer("/operation/name").and_then(Value::as_str));
        if let Some(name) = operation_name {
            let vertex = self.client.vertex();
            OperationDescriptor::processing(name, prompt)
                .with_location(&vertex.project_id, &vertex.region)
                .write(&descriptor_path)
                .await?;
            return Ok(Accepted::Outcome(GenerateOutcome::Processing {
                operation_id: name.to_string(),
                message: format!(
                    "{} generation in progress. The system will automatically poll for completion.",
                    kind.label()
                ),
                note: Some(PROCESSING_NOTE.to_string()),
                data: None,
            }));
        }

        let immediate = ["videoUrl", "video", "videoUri"]
            .iter()
            .find_map(|key| data.get(*key).and_then(Value::as_str));
        if let Some(uri) = immediate {
            tracing::info!(%kind, "Video ready, downloading from {}", uri);
            let bytes = match self.client.download(uri).await {
                Ok(bytes) => bytes,
                Err(e) => return Ok(Accepted::DownloadFailed(e.to_string())),
            };
            let size = asset.store(&bytes).await?;
            return Ok(Accepted::Outcome(GenerateOutcome::Completed {
                message: format!("{} generated and saved successfully", kind.label()),
                video_url: asset.public_url(),
                path: asset.path().to_path_buf(),
                size,
            }));
        }

        if let Some(id) = data.get("operationId").and_then(Value::as_str) {
            let operation_id = id.to_string();
            OperationDescriptor::processing(&operation_id, prompt)
                .with_response_data(data)
                .write(&descriptor_path)
                .await?;
            return Ok(Accepted::Outcome(GenerateOutcome::Processing {
                operation_id,
                message: format!(
                    "{} generation in progress. The system will poll for completion.",
                    kind.label()
                ),
                note: Some("This may take 5-10 minutes.".to_string()),
                data: None,
            }));
        }

        let operation_id = format!("{}-{}", kind.id_prefix(), chrono::Utc::now().timestamp_millis());
        tracing::warn!(%kind, "Unrecognized response shape, returning {}", operation_id);
        Ok(Accepted::Outcome(GenerateOutcome::Processing {
            operation_id,
            message: format!("{} generation initiated. Please wait...", kind.label()),
            note: None,
            data: Some(data),
        }))
    }

    pub async fn poll(&self, kind: VideoKind, operation_id: &str) -> Result<PollOutcome> {
        let asset = self.asset(kind);
        if let Some(info) = asset.probe().await? {
            return Ok(PollOutcome::Completed {
                video_url: asset.public_url(),
                message: format!("{} already exists", kind.label()),
                size: Some(info.size),
            });
        }

        let descriptor_path = kind.operation_path(&self.videos_dir);
        let descriptor = OperationDescriptor::read(&descriptor_path).await;

        let vertex = self.client.vertex();
        let project = descriptor
            .as_ref()
            .and_then(|d| d.project_id.clone())
            .unwrap_or_else(|| vertex.project_id.clone());
        let region = descriptor
            .as_ref()
            .and_then(|d| d.region.clone())
            .unwrap_or_else(|| vertex.region.clone());

        tracing::info!(%kind, "Polling operation {}", operation_id);
        let url = self.client.operation_url(operation_id, &project, &region)?;

        match self.client.get(url).await {
            Ok(response) if response.is_success() => {
                match serde_json::from_str::<Value>(&response.body) {
                    Ok(data) => {
                        if let Some(outcome) = self.resolve(kind, &asset, &descriptor_path, &data).await? {
                            return Ok(outcome);
                        }
                    }
                    Err(e) => tracing::warn!(%kind, "Poll response was not JSON: {}", e),
                }
            }
            Ok(response) => {
                tracing::warn!(
                    %kind,
                    status = response.status,
                    "Poll API error: {}",
                    sniff::snippet(&response.body, 500)
                );
            }
            Err(e) => tracing::warn!(%kind, "Polling error: {}", e),
        }

        match descriptor {
            Some(d) if d.operation_id == operation_id => Ok(PollOutcome::Processing {
                message: format!(
                    "{} generation in progress. Please check again in a few minutes.",
                    kind.label()
                ),
                progress: None,
            }),
            _ => Ok(PollOutcome::NotFound {
                error: "Operation not found".to_string(),
            }),
        }
    }

    /// Interpret a successful operation GET. `None` means the body could not
    /// be used and the caller should fall back to the descriptor.
    async fn resolve(
        &self,
        kind: VideoKind,
        asset: &CachedAsset,
        descriptor_path: &Path,
        data: &Value,
    ) -> Result<Option<PollOutcome>> {
        let done = data.get("done").and_then(Value::as_bool).unwrap_or(false);
        tracing::debug!(%kind, done, "Poll response");

        if done {
            if let Some(response) = data.get("response").filter(|r| !r.is_null()) {
                match video_uri(response) {
                    Some(uri) => {
                        tracing::info!(%kind, "Video ready, downloading");
                        let bytes = match self.client.download(uri).await {
                            Ok(bytes) => bytes,
                            Err(e) => {
                                tracing::error!(%kind, "Download failed: {}", e);
                                return Ok(Some(PollOutcome::DownloadFailed {
                                    error: e.to_string(),
                                    message: format!(
                                        "{} is ready but could not be downloaded. Polling will retry the download.",
                                        kind.label()
                                    ),
                                }));
                            }
                        };
                        let size = asset.store(&bytes).await?;
                        OperationDescriptor::remove(descriptor_path).await?;
                        return Ok(Some(PollOutcome::Completed {
                            video_url: asset.public_url(),
                            message: format!("{} generated and saved successfully", kind.label()),
                            size: Some(size),
                        }));
                    }
                    None => {
                        tracing::warn!(
                            %kind,
                            "Operation completed without a video URI: {}",
                            sniff::snippet(&response.to_string(), 1000)
                        );
                    }
                }
            }

            if let Some(error) = data.get("error").filter(|e| !e.is_null()) {
                tracing::error!(%kind, "Operation failed: {}", error);
                OperationDescriptor::remove(descriptor_path).await?;
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} generation failed", kind.label()));
                return Ok(Some(PollOutcome::Failed {
                    error: message,
                    details: error.clone(),
                }));
            }
        }

        Ok(Some(PollOutcome::Processing {
            message: format!("{} generation in progress...", kind.label()),
            progress: data.pointer("/metadata/progress").filter(|p| !p.is_null()).cloned(),
        }))
    }
}

/// Locate the generated video URI in a finished operation's `response`.
pub fn video_uri(response: &Value) -> Option<&str> {
    response
        .pointer("/generateVideoResponse/generatedSamples/0/video/uri")
        .and_then(Value::as_str)
        .or_else(|| response.get("videoUrl").and_then(Value::as_str))
        .or_else(|| {
            response.get("video").and_then(|video| {
                video
                    .as_str()
                    .or_else(|| video.get("uri").and_then(Value::as_str))
            })
        })
        .or_else(|| response.get("videoUri").and_then(Value::as_str))
}

fn unavailable(kind: VideoKind, script: String, failures: Vec<AttemptFailure>) -> Unavailable {
    let error = match failures.last() {
        Some(last) => format!(
            "{} generation requires special API access that is not currently available (last attempt: {})",
            kind.label(),
            last
        ),
        None => "No video generation models are configured".to_string(),
    };
    let asset_hint = format!("public/videos/{}", kind.asset_file());
    let script_hint = format!("public/videos/{}", kind.script_file());

    Unavailable {
        error,
        message: format!(
            "{} generation is not available through the standard Gemini API. It requires special access from Google.",
            kind.label()
        ),
        solution: "manual_upload".to_string(),
        video_script: script,
        script_path: kind.public_script_url(),
        instructions: vec![
            "1. A detailed video script has been generated using Gemini AI".to_string(),
            "2. You can use this script with video production tools or services".to_string(),
            format!("3. Alternatively, manually upload a video file to: {asset_hint}"),
            format!("4. The script is saved at: {script_hint}"),
        ],
        alternative_options: vec![
            "Use the generated script with video production software".to_string(),
            "Use alternative AI video generation services (RunwayML, Pika, etc.)".to_string(),
            "Manually create and upload the video file".to_string(),
            "Contact Google for Veo 3 API access if available".to_string(),
        ],
        attempts: failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_video_uri_precedence() {
        let nested = json!({
            "generateVideoResponse": {"generatedSamples": [{"video": {"uri": "gs://a"}}]},
            "videoUrl": "https://b"
        });
        assert_eq!(video_uri(&nested), Some("gs://a"));
        assert_eq!(video_uri(&json!({"videoUrl": "https://b", "videoUri": "c"})), Some("https://b"));
        assert_eq!(video_uri(&json!({"video": "https://d"})), Some("https://d"));
        assert_eq!(video_uri(&json!({"video": {"uri": "https://e"}})), Some("https://e"));
        assert_eq!(video_uri(&json!({"videoUri": "https://f"})), Some("https://f"));
        assert_eq!(video_uri(&json!({"other": 1})), None);
    }

    #[test]
    fn test_outcome_serialization() {
        let processing = GenerateOutcome::Processing {
            operation_id: "op".into(),
            message: "m".into(),
            note: None,
            data: None,
        };
        let json = serde_json::to_value(&processing).unwrap();
        assert_eq!(json["status"], "processing");
        assert_eq!(json["operationId"], "op");
        assert!(json.get("note").is_none());

        let failure = AttemptFailure::new("veo-2.0-generate-001", FailureKind::HtmlPage { status: 404 });
        let outcome = GenerateOutcome::Unavailable(Box::new(unavailable(
            VideoKind::Showcase,
            "SCRIPT".into(),
            vec![failure],
        )));
        assert_eq!(outcome.http_status(), 503);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["solution"], "manual_upload");
        assert_eq!(json["videoScript"], "SCRIPT");
        assert_eq!(json["scriptPath"], "/videos/video-script.txt");
        assert_eq!(json["instructions"].as_array().unwrap().len(), 4);
        assert_eq!(json["alternativeOptions"].as_array().unwrap().len(), 4);
        assert_eq!(json["attempts"][0]["provider"], "veo-2.0-generate-001");
    }

    #[test]
    fn test_poll_status_codes() {
        let not_found = PollOutcome::NotFound {
            error: "Operation not found".into(),
        };
        assert_eq!(not_found.http_status(), 404);
        assert_eq!(serde_json::to_value(&not_found).unwrap()["status"], "error");

        let processing = PollOutcome::Processing {
            message: "m".into(),
            progress: None,
        };
        let json = serde_json::to_value(&processing).unwrap();
        assert_eq!(json["progress"], Value::Null);
        assert_eq!(processing.http_status(), 200);
    }
}
