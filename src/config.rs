use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::PipError;

/// Runtime configuration for the mirroring engine.
///
/// Every section falls back to its defaults, so a host only needs to supply the
/// values it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipConfig {
    pub window: WindowConfig,
    pub update_interval_ms: u64,
    pub locator_timeout_ms: u64,
    pub font_stylesheet_url: String,
    pub artwork: ArtworkConfig,
    pub player_url: String,
    pub selectors: PlayerSelectors,
    pub labels: Labels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkConfig {
    /// Edge length requested when rewriting the thumbnail size token.
    pub size: u32,
}

/// Stable hooks into the primary player surface.
///
/// Controls take a list of candidate selectors; the first one that resolves wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSelectors {
    pub player_bar: String,
    pub launcher_container: String,
    pub launcher_class: String,
    pub play_pause: Vec<String>,
    pub previous: Vec<String>,
    pub next: Vec<String>,
    pub shuffle: Vec<String>,
    pub repeat: Vec<String>,
    pub title: String,
    pub byline: String,
    pub artwork: String,
    pub media: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub no_track: String,
    pub unknown_artist: String,
    pub launcher_title: String,
    pub fallback_failed: String,
    pub reload_required: String,
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            update_interval_ms: 500,
            locator_timeout_ms: 10_000,
            font_stylesheet_url:
                "https://fonts.googleapis.com/css2?family=Noto+Sans+KR:wght@400;500;700&display=swap"
                    .to_string(),
            artwork: ArtworkConfig::default(),
            player_url: "https://music.youtube.com".to_string(),
            selectors: PlayerSelectors::default(),
            labels: Labels::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 250,
        }
    }
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self { size: 226 }
    }
}

impl Default for PlayerSelectors {
    fn default() -> Self {
        let bar = "ytmusic-player-bar";
        Self {
            player_bar: bar.to_string(),
            launcher_container: format!("{bar} .right-controls-buttons"),
            launcher_class: "ytm-pip-button".to_string(),
            play_pause: vec![format!("{bar} #play-pause-button")],
            previous: vec![format!("{bar} .previous-button")],
            next: vec![format!("{bar} .next-button")],
            shuffle: vec![
                format!("{bar} [aria-label*=\"shuffle\"]"),
                format!("{bar} .shuffle"),
            ],
            repeat: vec![
                format!("{bar} [aria-label*=\"repeat\"]"),
                format!("{bar} .repeat"),
            ],
            title: format!("{bar} .title"),
            byline: format!("{bar} .byline"),
            artwork: format!("{bar} img.image"),
            media: "video".to_string(),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            no_track: "No track playing".to_string(),
            unknown_artist: "Artist".to_string(),
            launcher_title: "Picture-in-Picture mode".to_string(),
            fallback_failed:
                "Unable to enable Picture-in-Picture. Start playing a track first.".to_string(),
            reload_required:
                "Reload the YouTube Music page to enable Picture-in-Picture.".to_string(),
        }
    }
}

impl PipConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, PipError> {
        let config: PipConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        log::info!("Loading engine configuration from {}", path.display());
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), PipError> {
        if self.update_interval_ms == 0 {
            return Err(PipError::Config("update_interval_ms must be positive".into()));
        }
        if self.locator_timeout_ms == 0 {
            return Err(PipError::Config("locator_timeout_ms must be positive".into()));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(PipError::Config(format!(
                "window size {}x{} is empty",
                self.window.width, self.window.height
            )));
        }
        if self.artwork.size == 0 {
            return Err(PipError::Config("artwork.size must be positive".into()));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn locator_timeout(&self) -> Duration {
        Duration::from_millis(self.locator_timeout_ms)
    }
}
