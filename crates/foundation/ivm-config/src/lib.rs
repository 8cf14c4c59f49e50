//! IVM Config
//!
//! Layered configuration for the showroom server and CLI:
//!
//! 1. built-in defaults
//! 2. YAML file at `$IVM_CONFIG`, else `~/.config/ivm/config.yaml` (optional)
//! 3. environment variables (API keys, project, region, paths)
//!
//! No credentials are compiled in; an unset key is sent as an empty string
//! and the upstream rejects it, which the video workflow treats like any
//! other provider failure.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Environment variable names read by [`ShowroomConfig::apply_env`].
pub mod env {
    pub const CONFIG_PATH: &str = "IVM_CONFIG";
    pub const BIND: &str = "IVM_BIND";
    pub const DATA_DIR: &str = "IVM_DATA_DIR";
    pub const VERTEX_API_KEY: &str = "VERTEX_AI_API_KEY";
    pub const PROJECT_ID: &str = "GOOGLE_CLOUD_PROJECT_ID";
    pub const REGION: &str = "GOOGLE_CLOUD_REGION";
    pub const VERTEX_ENDPOINT: &str = "IVM_VERTEX_ENDPOINT";
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    pub const GENERATIVE_ENDPOINT: &str = "IVM_GENERATIVE_ENDPOINT";
    pub const REQUEST_TIMEOUT: &str = "IVM_REQUEST_TIMEOUT_SECS";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowroomConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub vertex: VertexConfig,
    pub generative: GenerativeConfig,
    pub polling: PollingConfig,
    /// Timeout applied to every outbound request.
    pub request_timeout_secs: u64,
}

impl Default for ShowroomConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            vertex: VertexConfig::default(),
            generative: GenerativeConfig::default(),
            polling: PollingConfig::default(),
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Idle visitor sessions older than this are dropped from memory.
    /// Their storage files stay on disk and are reloaded on the next visit.
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            session_ttl_secs: 1800,
        }
    }
}

impl ServerConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Public root; generated files live in `<data_dir>/videos`.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("public"),
        }
    }
}

impl StorageConfig {
    pub fn videos_dir(&self) -> PathBuf {
        self.data_dir.join("videos")
    }

    pub fn visitor_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexConfig {
    pub api_key: String,
    pub project_id: String,
    pub region: String,
    /// Override for the regional `aiplatform` host (used by tests and proxies).
    pub endpoint: Option<String>,
    /// Tried in order; first accepted request wins.
    pub video_models: Vec<String>,
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            region: "us-central1".to_string(),
            endpoint: None,
            video_models: vec![
                "veo-3.1-generate-preview".to_string(),
                "veo-3.0-generate-001".to_string(),
                "veo-3.0-fast-generate-001".to_string(),
                "veo-2.0-generate-001".to_string(),
            ],
        }
    }
}

impl VertexConfig {
    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.region),
        }
    }

    /// Host for a region other than the configured one (descriptor override).
    pub fn base_url_for(&self, region: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{region}-aiplatform.googleapis.com"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerativeConfig {
    pub api_key: String,
    pub endpoint: String,
    /// Model used to draft the production script (v1 API).
    pub script_model: String,
    /// Text proxy chain (v1beta API).
    pub text_models: Vec<String>,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            script_model: "gemini-pro".to_string(),
            text_models: vec!["gemini-1.5-flash".to_string(), "gemini-pro".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_secs: u64,
    pub max_polls: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            max_polls: 20,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl ShowroomConfig {
    /// Default config file location (~/.config/ivm/config.yaml).
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ivm")
            .join("config.yaml")
    }

    /// Defaults, then the YAML file if present, then the process environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var(env::CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());

        let mut config = Self::from_file_or_default(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Overlay variables returned by `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(env::BIND) {
            self.server.bind = v;
        }
        if let Some(v) = get(env::DATA_DIR) {
            self.storage.data_dir = PathBuf::from(v);
        }
        if let Some(v) = get(env::VERTEX_API_KEY) {
            self.vertex.api_key = v;
        }
        if let Some(v) = get(env::PROJECT_ID) {
            self.vertex.project_id = v;
        }
        if let Some(v) = get(env::REGION) {
            self.vertex.region = v;
        }
        if let Some(v) = get(env::VERTEX_ENDPOINT) {
            self.vertex.endpoint = Some(v);
        }
        if let Some(v) = get(env::GEMINI_API_KEY) {
            self.generative.api_key = v;
        }
        if let Some(v) = get(env::GENERATIVE_ENDPOINT) {
            self.generative.endpoint = v;
        }
        if let Some(v) = get(env::REQUEST_TIMEOUT) {
            self.request_timeout_secs = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: env::REQUEST_TIMEOUT.to_string(),
                value: v.clone(),
            })?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ShowroomConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.server.session_ttl(), Duration::from_secs(1800));
        assert_eq!(config.vertex.region, "us-central1");
        assert_eq!(config.vertex.video_models.len(), 4);
        assert_eq!(config.vertex.video_models[0], "veo-3.1-generate-preview");
        assert_eq!(config.polling.max_polls, 20);
        assert_eq!(config.polling.interval(), Duration::from_secs(30));
        assert_eq!(config.storage.videos_dir(), PathBuf::from("public/videos"));
        assert!(config.vertex.api_key.is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
server:
  bind: "0.0.0.0:8080"
vertex:
  project_id: "showroom-prod"
polling:
  max_polls: 5
"#;
        let config = ShowroomConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.vertex.project_id, "showroom-prod");
        assert_eq!(config.vertex.region, "us-central1");
        assert_eq!(config.polling.max_polls, 5);
        assert_eq!(config.polling.interval_secs, 30);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (env::VERTEX_API_KEY, "vertex-key"),
            (env::GEMINI_API_KEY, "gemini-key"),
            (env::REGION, "europe-west4"),
            (env::DATA_DIR, "/srv/ivm"),
            (env::BIND, "   "),
        ]);
        let mut config = ShowroomConfig::default();
        config
            .apply_env(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.vertex.api_key, "vertex-key");
        assert_eq!(config.generative.api_key, "gemini-key");
        assert_eq!(config.vertex.region, "europe-west4");
        assert_eq!(config.storage.data_dir, PathBuf::from("/srv/ivm"));
        // blank values do not clobber
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(
            config.vertex.base_url(),
            "https://europe-west4-aiplatform.googleapis.com"
        );
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = ShowroomConfig::default();
        let err = config
            .apply_env(|k| (k == env::REQUEST_TIMEOUT).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_endpoint_override() {
        let mut config = ShowroomConfig::default();
        config.vertex.endpoint = Some("http://127.0.0.1:9999/".to_string());
        assert_eq!(config.vertex.base_url(), "http://127.0.0.1:9999");
        assert_eq!(config.vertex.base_url_for("asia-east1"), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert_eq!(
            ShowroomConfig::from_file_or_default(&missing).unwrap(),
            ShowroomConfig::default()
        );

        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "request_timeout_secs: 15\n").unwrap();
        let config = ShowroomConfig::from_file_or_default(&path).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(15));

        std::fs::write(&path, "server: [not, a, map]\n").unwrap();
        assert!(matches!(
            ShowroomConfig::from_file_or_default(&path),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
