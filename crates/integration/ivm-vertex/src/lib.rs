//! IVM Vertex
//!
//! Orchestration of the third-party generative APIs behind the showroom:
//!
//! ```text
//!   generate ──> cached asset? ──yes──> exists
//!       │
//!       no
//!       ▼
//!   script chain (text) ──fail──> static script template
//!       │
//!       ▼
//!   video chain: veo-3.1 ─x─> veo-3.0 ─x─> veo-3.0-fast ─x─> veo-2.0 ─x─> 503 + script
//!       │ first accepted
//!       ▼
//!   operation descriptor ──poll──> done? ──> download ──> cached asset
//! ```
//!
//! [`direct`] is a thinner pass-through (`:predict`, then
//! `:generateVideos`) that leaves storage to the caller.
//!
//! Policy is deliberately plain: one attempt per model, first success wins,
//! no backoff. Existence of the cached asset is the only completion signal
//! and nothing guards check-then-write against concurrent requests.

pub mod asset;
pub mod chain;
pub mod client;
pub mod descriptor;
pub mod direct;
pub mod kind;
pub mod poll;
pub mod providers;
pub mod scripts;
pub mod sniff;
pub mod text;
pub mod workflow;

pub use asset::{AssetInfo, AssetStatus, CachedAsset};
pub use chain::{AttemptFailure, ChainOutcome, FailureKind, FallbackChain, Provider};
pub use client::UpstreamClient;
pub use descriptor::OperationDescriptor;
pub use direct::{DirectOutcome, DirectVideoProxy};
pub use kind::VideoKind;
pub use poll::{PollDriver, PollError, PollResponse, PollSource, ServerPollSource};
pub use providers::{ApiVersion, TextModel, TextRequest, VeoModel, VideoRequest};
pub use sniff::{classify, BodyKind};
pub use text::{ContentKind, ProbeOutcome, TextProxy};
pub use workflow::{GenerateOutcome, PollOutcome, Unavailable, VideoWorkflow};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VertexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Text generation failed: {0}")]
    TextUnavailable(String),
}

pub type Result<T> = std::result::Result<T, VertexError>;
