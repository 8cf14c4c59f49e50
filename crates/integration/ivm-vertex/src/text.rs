//! Text-generation proxy and upstream probe

use crate::chain::{ChainOutcome, FallbackChain, Provider};
use crate::client::{ApiVersion, UpstreamClient};
use crate::providers::{candidate_text, TextModel, TextRequest};
use crate::{sniff, Result, VertexError};
use serde::Serialize;
use serde_json::json;

pub const DEFAULT_PROMPT: &str = "Generate content for the IVM showroom virtual tour";
const PROBE_PROMPT: &str = "Say \"API is working\" if you can read this.";

const DESCRIPTION_SYSTEM: &str = "You are a luxury car showroom content writer. Generate an \
engaging, premium description for a virtual tour video of an Innoson Vehicle Manufacturing (IVM) \
showroom.

The description should:
- Be 2-3 sentences long
- Highlight the premium experience, craftsmanship, and luxury features
- Emphasize the pride of African roads
- Be professional yet inviting
- Focus on the virtual tour experience

Generate the description:";

const METADATA_SYSTEM: &str = "Generate SEO-friendly metadata for a virtual tour video of an \
Innoson Vehicle Manufacturing showroom.

Return a JSON object with:
- title: A compelling title (max 60 characters)
- description: A detailed description (max 160 characters)
- keywords: Array of relevant keywords

Format as JSON only:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    VideoDescription,
    VideoMetadata,
    Plain,
}

impl ContentKind {
    /// Unknown or missing types get no system prompt.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("video-description") => Self::VideoDescription,
            Some("video-metadata") => Self::VideoMetadata,
            _ => Self::Plain,
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::VideoDescription => DESCRIPTION_SYSTEM,
            Self::VideoMetadata => METADATA_SYSTEM,
            Self::Plain => "",
        }
    }
}

/// Full text sent upstream: system prompt, blank line, user prompt.
pub fn compose(kind: ContentKind, prompt: Option<&str>) -> String {
    let prompt = prompt.filter(|p| !p.trim().is_empty()).unwrap_or(DEFAULT_PROMPT);
    format!("{}\n\n{}", kind.system_prompt(), prompt)
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ProbeOutcome {
    Success {
        message: String,
        response: String,
        api_key_configured: bool,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
        #[serde(skip)]
        upstream_status: u16,
    },
}

impl ProbeOutcome {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Success { .. } => 200,
            Self::Error {
                upstream_status, ..
            } => *upstream_status,
        }
    }
}

#[derive(Clone)]
pub struct TextProxy {
    client: UpstreamClient,
}

impl TextProxy {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    fn chain(&self) -> FallbackChain<TextModel> {
        FallbackChain::new(
            self.client
                .generative()
                .text_models
                .iter()
                .map(|model| TextModel::new(self.client.clone(), model.as_str(), ApiVersion::V1Beta))
                .collect(),
        )
    }

    pub async fn generate(&self, prompt: Option<&str>, content_type: Option<&str>) -> Result<String> {
        if self.client.generative().api_key.is_empty() {
            return Err(VertexError::TextUnavailable(
                "GEMINI_API_KEY is not configured".to_string(),
            ));
        }

        let request = TextRequest::new(compose(ContentKind::parse(content_type), prompt));
        match self.chain().run(&request).await {
            ChainOutcome::Success { output, .. } => Ok(output),
            ChainOutcome::Exhausted { failures } => {
                let detail = failures
                    .last()
                    .map(|f| f.kind.to_string())
                    .unwrap_or_else(|| "no text models configured".to_string());
                tracing::error!("Text generation failed: {}", detail);
                Err(VertexError::TextUnavailable(detail))
            }
        }
    }

    /// One request to the first text model with a fixed prompt.
    pub async fn probe(&self) -> ProbeOutcome {
        let generative = self.client.generative();
        if generative.api_key.is_empty() {
            return ProbeOutcome::Error {
                message: "API key not configured".to_string(),
                details: None,
                upstream_status: 500,
            };
        }
        let Some(model) = generative.text_models.first() else {
            return ProbeOutcome::Error {
                message: "No text models configured".to_string(),
                details: None,
                upstream_status: 500,
            };
        };

        let url = match self.client.generate_content_url(ApiVersion::V1Beta, model) {
            Ok(url) => url,
            Err(e) => return internal_error(e),
        };
        let body = json!({ "contents": [{ "parts": [{ "text": PROBE_PROMPT }] }] });

        let response = match self.client.post_json(url, &body).await {
            Ok(response) => response,
            Err(e) => return internal_error(e),
        };
        if !response.is_success() {
            let reason = reqwest::StatusCode::from_u16(response.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("");
            return ProbeOutcome::Error {
                message: format!("API request failed: {} {}", response.status, reason)
                    .trim_end()
                    .to_string(),
                details: Some(sniff::snippet(&response.body, 500)),
                upstream_status: response.status,
            };
        }

        match serde_json::from_str::<serde_json::Value>(&response.body) {
            Ok(data) => ProbeOutcome::Success {
                message: "API connection successful".to_string(),
                response: candidate_text(&data)
                    .unwrap_or("No response text found")
                    .to_string(),
                api_key_configured: true,
            },
            Err(e) => internal_error(e),
        }
    }

    /// Model names in chain order
    pub fn models(&self) -> Vec<String> {
        self.chain().providers().map(|p| p.name().to_string()).collect()
    }
}

fn internal_error(error: impl std::fmt::Display) -> ProbeOutcome {
    ProbeOutcome::Error {
        message: error.to_string(),
        details: None,
        upstream_status: 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind() {
        assert_eq!(ContentKind::parse(Some("video-description")), ContentKind::VideoDescription);
        assert_eq!(ContentKind::parse(Some("video-metadata")), ContentKind::VideoMetadata);
        assert_eq!(ContentKind::parse(Some("description")), ContentKind::Plain);
        assert_eq!(ContentKind::parse(None), ContentKind::Plain);
    }

    #[test]
    fn test_compose() {
        assert_eq!(compose(ContentKind::Plain, None), format!("\n\n{DEFAULT_PROMPT}"));
        let text = compose(ContentKind::VideoMetadata, Some("G80 tour"));
        assert!(text.starts_with("Generate SEO-friendly metadata"));
        assert!(text.ends_with("Format as JSON only:\n\nG80 tour"));
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let config = ivm_config::ShowroomConfig::default();
        let proxy = TextProxy::new(UpstreamClient::new(&config).unwrap());

        let err = proxy.generate(Some("hi"), None).await.unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));

        let probe = proxy.probe().await;
        assert_eq!(probe.http_status(), 500);
        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json.get("upstreamStatus").is_none());
    }

    #[test]
    fn test_models_follow_config() {
        let config = ivm_config::ShowroomConfig::default();
        let proxy = TextProxy::new(UpstreamClient::new(&config).unwrap());
        assert_eq!(proxy.models(), vec!["gemini-1.5-flash", "gemini-pro"]);
    }
}
