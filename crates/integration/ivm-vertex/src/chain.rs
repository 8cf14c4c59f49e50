//! Fallback Chain
//!
//! Ordered providers, one attempt each. The first success wins; every
//! failure before it is collected so callers can report what was tried.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// A single upstream model reachable through one request shape.
#[async_trait]
pub trait Provider: Send + Sync {
    type Request: Send + Sync;
    type Output: Send;

    /// Model identifier, used in logs and diagnostics
    fn name(&self) -> &str;

    /// Make exactly one attempt
    async fn attempt(&self, request: &Self::Request) -> Result<Self::Output, AttemptFailure>;
}

/// Why an attempt was not accepted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection refused, DNS, timeout
    Transport { message: String },
    /// An HTML page came back (typically a 404 for an unknown model)
    HtmlPage { status: u16 },
    /// A JSON error envelope came back
    Upstream { status: u16, message: String },
    /// Neither JSON nor HTML
    NonJson { status: u16, snippet: String },
    /// 2xx that could not be parsed or lacked the expected fields
    Malformed { reason: String },
    /// 2xx with no usable content
    Empty,
    /// Accepted, but the returned video could not be fetched
    Download { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptFailure {
    pub provider: String,
    #[serde(flatten)]
    pub kind: FailureKind,
}

impl AttemptFailure {
    pub fn new(provider: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            provider: provider.into(),
            kind,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { message } => write!(f, "network error: {message}"),
            Self::HtmlPage { status } => {
                write!(f, "HTTP {status}: endpoint returned an HTML page (model may not exist)")
            }
            Self::Upstream { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::NonJson { status, snippet } => write!(f, "HTTP {status}: non-JSON response: {snippet}"),
            Self::Malformed { reason } => write!(f, "malformed response: {reason}"),
            Self::Empty => write!(f, "empty response"),
            Self::Download { message } => write!(f, "video download failed: {message}"),
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.kind)
    }
}

#[derive(Debug)]
pub enum ChainOutcome<T> {
    Success {
        provider: String,
        output: T,
        failures: Vec<AttemptFailure>,
    },
    Exhausted {
        failures: Vec<AttemptFailure>,
    },
}

pub struct FallbackChain<P> {
    providers: Vec<P>,
}

impl<P: Provider> FallbackChain<P> {
    pub fn new(providers: Vec<P>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> impl Iterator<Item = &P> {
        self.providers.iter()
    }

    pub async fn run(&self, request: &P::Request) -> ChainOutcome<P::Output> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            tracing::info!(model = provider.name(), "Trying model");
            match provider.attempt(request).await {
                Ok(output) => {
                    tracing::info!(model = provider.name(), "Model accepted request");
                    return ChainOutcome::Success {
                        provider: provider.name().to_string(),
                        output,
                        failures,
                    };
                }
                Err(failure) => {
                    tracing::warn!(model = provider.name(), "Model failed: {}", failure.kind);
                    failures.push(failure);
                }
            }
        }

        ChainOutcome::Exhausted { failures }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        name: &'static str,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Provider for Scripted {
        type Request = String;
        type Output = String;

        fn name(&self) -> &str {
            self.name
        }

        async fn attempt(&self, request: &String) -> Result<String, AttemptFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(format!("{}:{}", self.name, request))
            } else {
                Err(AttemptFailure::new(self.name, FailureKind::HtmlPage { status: 404 }))
            }
        }
    }

    fn chain(pattern: &[bool]) -> (FallbackChain<Scripted>, Arc<AtomicUsize>) {
        const NAMES: [&str; 4] = ["a", "b", "c", "d"];
        let calls = Arc::new(AtomicUsize::new(0));
        let providers = pattern
            .iter()
            .zip(NAMES)
            .map(|(&succeed, name)| Scripted {
                name,
                succeed,
                calls: calls.clone(),
            })
            .collect();
        (FallbackChain::new(providers), calls)
    }

    #[tokio::test]
    async fn test_first_success_stops_the_chain() {
        let (chain, calls) = chain(&[false, true, true]);
        match chain.run(&"go".to_string()).await {
            ChainOutcome::Success {
                provider,
                output,
                failures,
            } => {
                assert_eq!(provider, "b");
                assert_eq!(output, "b:go");
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].provider, "a");
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausted_tries_each_once() {
        let (chain, calls) = chain(&[false, false, false, false]);
        match chain.run(&"go".to_string()).await {
            ChainOutcome::Exhausted { failures } => {
                let tried: Vec<_> = failures.iter().map(|f| f.provider.as_str()).collect();
                assert_eq!(tried, ["a", "b", "c", "d"]);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_empty_chain_is_exhausted() {
        let chain: FallbackChain<Scripted> = FallbackChain::new(Vec::new());
        assert_eq!(chain.providers().count(), 0);
        assert!(matches!(
            chain.run(&String::new()).await,
            ChainOutcome::Exhausted { failures } if failures.is_empty()
        ));
    }

    #[test]
    fn test_failure_serializes_flat() {
        let failure = AttemptFailure::new("veo-2.0-generate-001", FailureKind::HtmlPage { status: 404 });
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["provider"], "veo-2.0-generate-001");
        assert_eq!(json["kind"], "html_page");
        assert_eq!(json["status"], 404);
        assert!(failure.to_string().contains("HTML page"));
    }
}
