//! Upstream HTTP client
//!
//! Builds Vertex / Generative Language URLs and wraps raw responses so the
//! providers can classify them.

use crate::chain::{AttemptFailure, FailureKind};
use crate::sniff::{self, BodyKind};
use crate::{Result, VertexError};
use ivm_config::{GenerativeConfig, ShowroomConfig, VertexConfig};
use serde_json::Value;
use url::Url;

/// Hosts that accept the API key as a `key` query parameter on downloads.
const KEYED_HOSTS: [&str; 3] = [
    "generativelanguage.googleapis.com",
    "aiplatform.googleapis.com",
    "storage.googleapis.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V1Beta,
}

impl ApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V1Beta => "v1beta",
        }
    }
}

/// Response body read to completion, status and content type kept.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl RawResponse {
    async fn read(response: reqwest::Response) -> std::result::Result<Self, reqwest::Error> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;
        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn kind(&self) -> BodyKind {
        sniff::classify(&self.content_type, &self.body)
    }

    pub fn snippet(&self, max: usize) -> String {
        sniff::snippet(&self.body, max)
    }

    /// Accept a 2xx JSON body or explain why not.
    pub fn into_json(self, provider: &str) -> std::result::Result<Value, AttemptFailure> {
        let kind = self.kind();
        let fail = |kind| AttemptFailure::new(provider, kind);

        if self.is_success() && kind == BodyKind::Json {
            return serde_json::from_str(&self.body).map_err(|e| {
                tracing::debug!("Unparseable success body: {}", self.snippet(200));
                fail(FailureKind::Malformed {
                    reason: format!("failed to parse successful response as JSON: {e}"),
                })
            });
        }

        if kind == BodyKind::Html {
            tracing::debug!("HTML response: {}", self.snippet(200));
            return Err(fail(FailureKind::HtmlPage {
                status: self.status,
            }));
        }

        match serde_json::from_str::<Value>(&self.body) {
            Ok(value) => {
                let message = sniff::error_message(&value)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} (response: {})", self.status, self.snippet(500)));
                Err(fail(FailureKind::Upstream {
                    status: self.status,
                    message,
                }))
            }
            Err(_) => Err(fail(FailureKind::NonJson {
                status: self.status,
                snippet: self.snippet(500),
            })),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    vertex: VertexConfig,
    generative: GenerativeConfig,
}

impl UpstreamClient {
    pub fn new(config: &ShowroomConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_http(http, config))
    }

    pub fn with_http(http: reqwest::Client, config: &ShowroomConfig) -> Self {
        Self {
            http,
            vertex: config.vertex.clone(),
            generative: config.generative.clone(),
        }
    }

    pub fn vertex(&self) -> &VertexConfig {
        &self.vertex
    }

    pub fn generative(&self) -> &GenerativeConfig {
        &self.generative
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `{base}/v1/projects/{p}/locations/{r}/publishers/google/models/{model}:predictLongRunning?key=`
    pub fn predict_url(&self, model: &str) -> Result<Url> {
        self.publisher_model_url(model, "predictLongRunning")
    }

    /// Synchronous `:predict` on the same publisher model.
    pub fn predict_sync_url(&self, model: &str) -> Result<Url> {
        self.publisher_model_url(model, "predict")
    }

    fn publisher_model_url(&self, model: &str, action: &str) -> Result<Url> {
        let v = &self.vertex;
        let mut url = Url::parse(&format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:{}",
            v.base_url(),
            v.project_id,
            v.region,
            model,
            action
        ))?;
        url.query_pairs_mut().append_pair("key", &v.api_key);
        Ok(url)
    }

    /// `{endpoint}/v1beta/models/{model}:generateVideos?key=`
    pub fn generate_videos_url(&self, model: &str) -> Result<Url> {
        self.generative_url(&format!("models/{model}:generateVideos"))
    }

    /// `{endpoint}/v1beta/{operation}?key=` for Generative Language operations.
    pub fn generative_operation_url(&self, operation: &str) -> Result<Url> {
        self.generative_url(operation.trim_start_matches('/'))
    }

    fn generative_url(&self, path: &str) -> Result<Url> {
        let g = &self.generative;
        let mut url = Url::parse(&format!(
            "{}/{}/{}",
            g.endpoint.trim_end_matches('/'),
            ApiVersion::V1Beta.as_str(),
            path
        ))?;
        url.query_pairs_mut().append_pair("key", &g.api_key);
        Ok(url)
    }

    /// `{endpoint}/{version}/models/{model}:generateContent?key=`
    pub fn generate_content_url(&self, version: ApiVersion, model: &str) -> Result<Url> {
        let g = &self.generative;
        let mut url = Url::parse(&format!(
            "{}/{}/models/{}:generateContent",
            g.endpoint.trim_end_matches('/'),
            version.as_str(),
            model
        ))?;
        url.query_pairs_mut().append_pair("key", &g.api_key);
        Ok(url)
    }

    /// Resolve an operation id into its GET URL. Full `projects/...` names
    /// are used as-is, `.../operations/...` tails get the project/location
    /// prefix, and bare ids are placed under `operations/`.
    pub fn operation_url(&self, operation_id: &str, project: &str, region: &str) -> Result<Url> {
        let path = if operation_id.starts_with("projects/") {
            operation_id.to_string()
        } else if operation_id.contains("/operations/") {
            format!("projects/{project}/locations/{region}/{operation_id}")
        } else {
            format!("projects/{project}/locations/{region}/operations/{operation_id}")
        };

        let mut url = Url::parse(&format!("{}/v1/{}", self.vertex.base_url_for(region), path))?;
        url.query_pairs_mut().append_pair("key", &self.vertex.api_key);
        Ok(url)
    }

    pub async fn post_json(
        &self,
        url: Url,
        body: &Value,
    ) -> std::result::Result<RawResponse, reqwest::Error> {
        let response = self.http.post(url).json(body).send().await?;
        RawResponse::read(response).await
    }

    pub async fn get(&self, url: Url) -> std::result::Result<RawResponse, reqwest::Error> {
        let response = self.http.get(url).send().await?;
        RawResponse::read(response).await
    }

    /// Append the API key to Google-hosted download URLs that lack one.
    pub fn with_download_key(&self, uri: &str) -> String {
        let Ok(mut url) = Url::parse(uri) else {
            return uri.to_string();
        };
        let keyed_host = url
            .host_str()
            .is_some_and(|host| KEYED_HOSTS.iter().any(|h| host.ends_with(h)));
        let has_key = url.query_pairs().any(|(k, _)| k == "key");

        if keyed_host && !has_key {
            url.query_pairs_mut().append_pair("key", &self.vertex.api_key);
        }
        url.to_string()
    }

    /// Fetch generated media. Tries with the API key as a bearer token,
    /// then once more without any authorization header.
    pub async fn download(&self, uri: &str) -> Result<Vec<u8>> {
        let target = self.with_download_key(uri);

        match self
            .http
            .get(&target)
            .bearer_auth(&self.vertex.api_key)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                return Ok(response.bytes().await?.to_vec());
            }
            Ok(response) => {
                tracing::warn!(
                    "Authorized download returned {}, retrying without authorization",
                    response.status()
                );
            }
            Err(e) => {
                tracing::warn!("Authorized download failed: {}, retrying without authorization", e);
            }
        }

        let response = self.http.get(&target).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VertexError::Download(
                status.canonical_reason().unwrap_or("unknown status").to_string(),
            ));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UpstreamClient {
        let mut config = ShowroomConfig::default();
        config.vertex.api_key = "vk".into();
        config.vertex.project_id = "proj".into();
        config.generative.api_key = "gk".into();
        UpstreamClient::new(&config).unwrap()
    }

    fn raw(status: u16, content_type: &str, body: &str) -> RawResponse {
        RawResponse {
            status,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    #[test]
    fn test_predict_url() {
        let url = client().predict_url("veo-2.0-generate-001").unwrap();
        assert_eq!(
            url.as_str(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/proj/locations/us-central1/\
             publishers/google/models/veo-2.0-generate-001:predictLongRunning?key=vk"
        );
    }

    #[test]
    fn test_generate_content_url() {
        let url = client()
            .generate_content_url(ApiVersion::V1Beta, "gemini-1.5-flash")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=gk"
        );
    }

    #[test]
    fn test_direct_video_urls() {
        let c = client();
        assert!(c
            .predict_sync_url("veo-3.1-generate-preview")
            .unwrap()
            .as_str()
            .ends_with("/models/veo-3.1-generate-preview:predict?key=vk"));
        assert_eq!(
            c.generate_videos_url("veo-3.1-generate-preview").unwrap().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/veo-3.1-generate-preview:generateVideos?key=gk"
        );
        assert_eq!(
            c.generative_operation_url("operations/abc").unwrap().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/operations/abc?key=gk"
        );
    }

    #[test]
    fn test_operation_url_forms() {
        let c = client();
        let base = "https://europe-west4-aiplatform.googleapis.com/v1";

        let full = c
            .operation_url("projects/x/locations/y/operations/1", "proj", "europe-west4")
            .unwrap();
        assert_eq!(full.as_str(), format!("{base}/projects/x/locations/y/operations/1?key=vk"));

        let tail = c
            .operation_url("publishers/google/models/veo/operations/2", "proj", "europe-west4")
            .unwrap();
        assert_eq!(
            tail.as_str(),
            format!("{base}/projects/proj/locations/europe-west4/publishers/google/models/veo/operations/2?key=vk")
        );

        let bare = c.operation_url("3", "proj", "europe-west4").unwrap();
        assert_eq!(
            bare.as_str(),
            format!("{base}/projects/proj/locations/europe-west4/operations/3?key=vk")
        );
    }

    #[test]
    fn test_download_key_only_for_google_hosts() {
        let c = client();
        assert_eq!(
            c.with_download_key("https://storage.googleapis.com/bucket/v.mp4"),
            "https://storage.googleapis.com/bucket/v.mp4?key=vk"
        );
        assert_eq!(
            c.with_download_key("https://storage.googleapis.com/v.mp4?alt=media&key=other"),
            "https://storage.googleapis.com/v.mp4?alt=media&key=other"
        );
        assert_eq!(
            c.with_download_key("https://cdn.example.com/v.mp4"),
            "https://cdn.example.com/v.mp4"
        );
    }

    #[test]
    fn test_into_json_classification() {
        assert!(raw(200, "application/json", r#"{"name":"op"}"#).into_json("m").is_ok());

        let html = raw(404, "text/html", "<!DOCTYPE html><p>404</p>").into_json("m").unwrap_err();
        assert_eq!(html.kind, FailureKind::HtmlPage { status: 404 });

        let upstream = raw(403, "application/json", r#"{"error":{"message":"denied"}}"#)
            .into_json("m")
            .unwrap_err();
        assert_eq!(
            upstream.kind,
            FailureKind::Upstream {
                status: 403,
                message: "denied".into()
            }
        );

        let plain = raw(502, "text/plain", "Bad Gateway").into_json("m").unwrap_err();
        assert!(matches!(plain.kind, FailureKind::NonJson { status: 502, .. }));

        let broken = raw(200, "application/json", "{oops").into_json("m").unwrap_err();
        assert!(matches!(broken.kind, FailureKind::Malformed { .. }));
    }
}
