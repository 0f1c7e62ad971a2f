//! Projects primary-surface state into the floating surface.
//!
//! The primary surface exposes no stable change notifications, so the window
//! manager drives [`StateProjector::project`] from a fixed-interval timer.

pub mod format;

use std::sync::Arc;

use crate::config::{Labels, PipConfig};
use crate::dom::HostDocument;
use crate::media::{PlaybackSnapshot, SnapshotReader, ToggleStateExtractor};
use crate::surface::markup::{
    ACTIVE_CLASS, ALBUM_ART, BG_LAYER, CURRENT_TIME, PAUSE_PATH, PLAY_ICON, PLAY_PATH,
    PROGRESS_BAR, REPEAT_BTN, SHUFFLE_BTN, TOTAL_TIME, TRACK_ARTIST, TRACK_TITLE,
    VOLUME_HIGH_PATH, VOLUME_ICON, VOLUME_LOW_PATH, VOLUME_MUTED_PATH, VOLUME_SLIDER,
};
use crate::surface::FloatingWindow;
use format::{format_time, progress_percent, slider_value, upscale_artwork_url, VolumeLevel};

pub struct StateProjector {
    reader: SnapshotReader,
    labels: Labels,
    artwork_size: u32,
}

impl StateProjector {
    pub fn new(document: Arc<dyn HostDocument>, config: &PipConfig) -> Self {
        Self {
            reader: SnapshotReader::new(document, config.selectors.clone()),
            labels: config.labels.clone(),
            artwork_size: config.artwork.size,
        }
    }

    pub fn with_extractors(
        mut self,
        shuffle: Box<dyn ToggleStateExtractor>,
        repeat: Box<dyn ToggleStateExtractor>,
    ) -> Self {
        self.reader = self
            .reader
            .with_shuffle_extractor(shuffle)
            .with_repeat_extractor(repeat);
        self
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.reader.read()
    }

    /// Read a fresh snapshot and write it into `window`.
    pub fn project(&self, window: &dyn FloatingWindow) -> PlaybackSnapshot {
        let snapshot = self.snapshot();
        self.render(&snapshot, window);
        snapshot
    }

    /// Fields that are `None` are skipped and keep their displayed value.
    pub fn render(&self, snapshot: &PlaybackSnapshot, window: &dyn FloatingWindow) {
        if let Some(url) = &snapshot.artwork_url {
            let resolved = upscale_artwork_url(url, self.artwork_size);
            // Only swap on change, otherwise the image reloads and flickers.
            if window.image_src(ALBUM_ART).as_deref() != Some(resolved.as_str()) {
                log::debug!("Artwork changed: {}", resolved);
                window.set_image_src(ALBUM_ART, &resolved);
                window.set_background_image(BG_LAYER, &resolved);
            }
        }

        if let Some(title) = &snapshot.title {
            render_text(window, TRACK_TITLE, title, &self.labels.no_track);
        }
        if let Some(artist) = &snapshot.artist {
            render_text(window, TRACK_ARTIST, artist, &self.labels.unknown_artist);
        }

        if let Some(media) = &snapshot.media {
            let icon = if media.is_paused { PLAY_PATH } else { PAUSE_PATH };
            window.set_inner_svg(PLAY_ICON, icon);

            window.set_width_percent(
                PROGRESS_BAR,
                progress_percent(media.current_time_seconds, media.duration_seconds),
            );
            window.set_text(CURRENT_TIME, &format_time(media.current_time_seconds));
            window.set_text(TOTAL_TIME, &format_time(media.duration_seconds));

            window.set_value(VOLUME_SLIDER, slider_value(media.volume, media.is_muted));
            let volume_icon = match VolumeLevel::from_media(media.volume, media.is_muted) {
                VolumeLevel::Muted => VOLUME_MUTED_PATH,
                VolumeLevel::Low => VOLUME_LOW_PATH,
                VolumeLevel::High => VOLUME_HIGH_PATH,
            };
            window.set_inner_svg(VOLUME_ICON, volume_icon);
        }

        if let Some(on) = snapshot.is_shuffle_on {
            window.toggle_class(SHUFFLE_BTN, ACTIVE_CLASS, on);
        }
        if let Some(on) = snapshot.is_repeat_on {
            window.toggle_class(REPEAT_BTN, ACTIVE_CLASS, on);
        }
    }
}

fn render_text(window: &dyn FloatingWindow, element_id: &str, text: &str, placeholder: &str) {
    let shown = if text.trim().is_empty() { placeholder } else { text };
    window.set_text(element_id, shown);
    window.set_title(element_id, text);
}
