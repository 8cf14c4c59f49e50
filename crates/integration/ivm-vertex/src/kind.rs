//! Video kinds
//!
//! Each kind owns a prompt, a clip length and a fixed set of files under
//! the videos directory.

use crate::scripts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const NEGATIVE_PROMPT: &str = "traffic, other vehicles, low quality, blurry, distorted";
pub const ASPECT_RATIO: &str = "16:9";
pub const RESOLUTION: &str = "1080p";

const SHOWCASE_PROMPT: &str = "A high-quality cinematic video of a sleek luxury SUV (Innoson G80) \
driving smoothly on a scenic highway during golden hour, showcasing the vehicle's premium design \
and performance. The car moves gracefully with smooth camera movement, highlighting the pride of \
African roads.";

const HERO_PROMPT: &str = "A cinematic, high-quality video showcasing the Innoson Vehicle \
Manufacturing fleet of premium SUVs driving smoothly on a scenic African highway during golden \
hour. Multiple luxury vehicles (Innoson G80, G40, and G5T models) are visible, moving gracefully \
in formation. The scene captures the pride of African roads with smooth camera movements, \
showcasing the premium design, craftsmanship, and performance of the entire fleet. The golden \
hour lighting creates a warm, luxurious atmosphere, highlighting the vehicles' sleek lines and \
premium finishes. The highway stretches into the distance, with African landscape visible in the \
background.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoKind {
    /// Single-vehicle highway clip
    Showcase,
    /// Fleet clip for the landing hero
    Hero,
}

impl VideoKind {
    pub const ALL: [VideoKind; 2] = [VideoKind::Showcase, VideoKind::Hero];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Showcase => "showcase",
            Self::Hero => "hero",
        }
    }

    /// Subject used in user-facing messages ("Video generation in progress")
    pub fn label(self) -> &'static str {
        match self {
            Self::Showcase => "Video",
            Self::Hero => "Hero video",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Self::Showcase => SHOWCASE_PROMPT,
            Self::Hero => HERO_PROMPT,
        }
    }

    pub fn duration_secs(self) -> u32 {
        match self {
            Self::Showcase => 8,
            Self::Hero => 10,
        }
    }

    /// Prefix for synthesized operation ids
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Showcase => "veo",
            Self::Hero => "hero-veo",
        }
    }

    pub fn asset_file(self) -> &'static str {
        match self {
            Self::Showcase => "innoson-g80-highway.mp4",
            Self::Hero => "hero-fleet-highway.mp4",
        }
    }

    pub fn operation_file(self) -> &'static str {
        match self {
            Self::Showcase => "operation-id.json",
            Self::Hero => "hero-operation-id.json",
        }
    }

    pub fn script_file(self) -> &'static str {
        match self {
            Self::Showcase => "video-script.txt",
            Self::Hero => "hero-video-script.txt",
        }
    }

    pub fn asset_path(self, videos_dir: &Path) -> PathBuf {
        videos_dir.join(self.asset_file())
    }

    pub fn operation_path(self, videos_dir: &Path) -> PathBuf {
        videos_dir.join(self.operation_file())
    }

    pub fn script_path(self, videos_dir: &Path) -> PathBuf {
        videos_dir.join(self.script_file())
    }

    /// URL the web server publishes the asset under
    pub fn public_url(self) -> String {
        format!("/videos/{}", self.asset_file())
    }

    pub fn public_script_url(self) -> String {
        format!("/videos/{}", self.script_file())
    }

    pub fn fallback_script(self, prompt: &str) -> String {
        let template = match self {
            Self::Showcase => scripts::SHOWCASE_TEMPLATE,
            Self::Hero => scripts::HERO_TEMPLATE,
        };
        scripts::render(template, prompt)
    }

    /// Server routes: (generate, poll)
    pub fn endpoints(self) -> (&'static str, &'static str) {
        match self {
            Self::Showcase => ("/api/gemini/generate-and-save", "/api/gemini/poll-video"),
            Self::Hero => ("/api/gemini/generate-hero-video", "/api/gemini/poll-hero-video"),
        }
    }
}

impl fmt::Display for VideoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for VideoKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "showcase" | "g80" => Ok(Self::Showcase),
            "hero" | "fleet" => Ok(Self::Hero),
            other => Err(format!("unknown video kind '{other}' (expected showcase or hero)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_are_distinct_per_kind() {
        let dir = Path::new("/tmp/videos");
        assert_ne!(
            VideoKind::Showcase.asset_path(dir),
            VideoKind::Hero.asset_path(dir)
        );
        assert_eq!(
            VideoKind::Hero.operation_path(dir),
            dir.join("hero-operation-id.json")
        );
        assert_eq!(VideoKind::Showcase.public_url(), "/videos/innoson-g80-highway.mp4");
    }

    #[test]
    fn test_fallback_script_uses_prompt() {
        let script = VideoKind::Hero.fallback_script(VideoKind::Hero.prompt());
        assert!(script.starts_with("HERO VIDEO PRODUCTION SCRIPT"));
        assert!(script.contains("G40, and G5T models"));
    }

    #[test]
    fn test_parse() {
        assert_eq!("Hero".parse::<VideoKind>().unwrap(), VideoKind::Hero);
        assert_eq!("showcase".parse::<VideoKind>().unwrap(), VideoKind::Showcase);
        assert!("trailer".parse::<VideoKind>().is_err());
    }
}
