//! Cached asset: presence of the file is the completion signal

use crate::kind::VideoKind;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct AssetInfo {
    pub path: PathBuf,
    pub size: u64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CachedAsset {
    kind: VideoKind,
    path: PathBuf,
}

impl CachedAsset {
    pub fn new(videos_dir: &Path, kind: VideoKind) -> Self {
        Self {
            kind,
            path: kind.asset_path(videos_dir),
        }
    }

    pub fn kind(&self) -> VideoKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn public_url(&self) -> String {
        self.kind.public_url()
    }

    /// Size and creation time if the file exists. Creation time falls back
    /// to modification time on filesystems without birth times.
    pub async fn probe(&self) -> Result<Option<AssetInfo>> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Some(AssetInfo {
            path: self.path.clone(),
            size: metadata.len(),
            created,
        }))
    }

    pub async fn store(&self, bytes: &[u8]) -> Result<u64> {
        tokio::fs::write(&self.path, bytes).await?;
        tracing::info!(kind = %self.kind, "Video saved to {}", self.path.display());
        Ok(bytes.len() as u64)
    }
}

/// Body of `GET` on a generate endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStatus {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AssetStatus {
    pub fn from_probe(asset: &CachedAsset, info: Option<AssetInfo>) -> Self {
        match info {
            Some(info) => Self {
                exists: true,
                video_url: Some(asset.public_url()),
                size: Some(info.size),
                created: Some(info.created),
                message: None,
            },
            None => Self {
                exists: false,
                video_url: None,
                size: None,
                created: None,
                message: Some(format!(
                    "{} not found. Generate it using POST endpoint.",
                    asset.kind().label()
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_missing_then_present() {
        let dir = tempfile::tempdir().unwrap();
        let asset = CachedAsset::new(dir.path(), VideoKind::Showcase);

        assert!(asset.probe().await.unwrap().is_none());
        let status = AssetStatus::from_probe(&asset, None);
        assert!(!status.exists);
        assert_eq!(
            status.message.as_deref(),
            Some("Video not found. Generate it using POST endpoint.")
        );

        assert_eq!(asset.store(b"mp4-bytes").await.unwrap(), 9);
        let info = asset.probe().await.unwrap().unwrap();
        assert_eq!(info.size, 9);
        assert_eq!(info.path, dir.path().join("innoson-g80-highway.mp4"));

        let json = serde_json::to_value(AssetStatus::from_probe(&asset, Some(info))).unwrap();
        assert_eq!(json["exists"], true);
        assert_eq!(json["videoUrl"], "/videos/innoson-g80-highway.mp4");
        assert_eq!(json["size"], 9);
        assert!(json.get("message").is_none());
    }

    #[tokio::test]
    async fn test_directory_is_not_an_asset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("hero-fleet-highway.mp4")).unwrap();
        let asset = CachedAsset::new(dir.path(), VideoKind::Hero);
        assert!(asset.probe().await.unwrap().is_none());
    }
}
