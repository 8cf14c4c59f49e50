//! Polling driver
//!
//! Client-side loop over a poll endpoint: fixed interval, bounded attempts,
//! no backoff. The first poll fires one interval after start. Dropping the
//! future cancels it.

use crate::kind::VideoKind;
use crate::Result;
use async_trait::async_trait;
use ivm_config::PollingConfig;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PollError {
    #[error("Video generation timed out after {attempts} polls. Please try again or use a manual video file.")]
    TimedOut { attempts: u32 },

    #[error("{0}")]
    Failed(String),
}

/// What the server's poll endpoint answers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    #[serde(default)]
    pub status: String,
    pub video_url: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
    /// An error the server expects to clear on a later poll (a 502 from a
    /// failed download keeps the operation alive).
    #[serde(skip)]
    pub retryable: bool,
}

#[async_trait]
pub trait PollSource: Send + Sync {
    async fn poll(&self, operation_id: &str) -> Result<PollResponse>;
}

#[derive(Debug, Clone, Copy)]
pub struct PollDriver {
    interval: Duration,
    max_polls: u32,
}

impl PollDriver {
    pub fn new(interval: Duration, max_polls: u32) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            max_polls,
        }
    }

    pub fn from_config(config: &PollingConfig) -> Self {
        Self::new(config.interval(), config.max_polls)
    }

    pub fn max_polls(&self) -> u32 {
        self.max_polls
    }

    /// Poll until completion, failure or the attempt bound. A request that
    /// fails outright still counts as an attempt. `on_progress` receives
    /// `(attempt, max)` after every unsuccessful poll.
    pub async fn run<S, F>(
        &self,
        source: &S,
        operation_id: &str,
        mut on_progress: F,
    ) -> std::result::Result<String, PollError>
    where
        S: PollSource + ?Sized,
        F: FnMut(u32, u32) + Send,
    {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for attempt in 1..=self.max_polls {
            ticker.tick().await;

            match source.poll(operation_id).await {
                Ok(response) => match response.status.as_str() {
                    "completed" => {
                        if let Some(url) = response.video_url {
                            tracing::info!(attempt, "Video ready at {}", url);
                            return Ok(url);
                        }
                    }
                    "error" if response.retryable => {
                        tracing::warn!(
                            attempt,
                            "Retryable poll error: {}",
                            response.error.or(response.message).unwrap_or_default()
                        );
                    }
                    "error" => {
                        let message = response
                            .error
                            .or(response.message)
                            .unwrap_or_else(|| "Video generation failed".to_string());
                        return Err(PollError::Failed(message));
                    }
                    _ => {}
                },
                Err(e) => tracing::warn!(attempt, "Poll request failed: {}", e),
            }

            on_progress(attempt, self.max_polls);
        }

        Err(PollError::TimedOut {
            attempts: self.max_polls,
        })
    }
}

/// Poll source backed by a running showroom server.
pub struct ServerPollSource {
    http: reqwest::Client,
    url: String,
}

impl ServerPollSource {
    pub fn new(http: reqwest::Client, base_url: &str, kind: VideoKind) -> Self {
        let (_, poll_path) = kind.endpoints();
        Self {
            http,
            url: format!("{}{}", base_url.trim_end_matches('/'), poll_path),
        }
    }
}

#[async_trait]
impl PollSource for ServerPollSource {
    async fn poll(&self, operation_id: &str) -> Result<PollResponse> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("operationId", operation_id)])
            .send()
            .await?;
        let retryable = response.status() == reqwest::StatusCode::BAD_GATEWAY;
        let body = response.text().await?;
        let mut parsed: PollResponse = serde_json::from_str(&body)?;
        parsed.retryable = retryable;
        Ok(parsed)
    }
}
