//! Relays control intents from the floating surface to the primary surface.
//!
//! The primary surface stays the single source of truth: discrete controls are
//! driven by clicking its own buttons, continuous ones by writing the media
//! element's properties. A missing target is expected while the page is in
//! transition and never surfaces as an error to the caller.

use std::sync::Arc;

use crate::config::PlayerSelectors;
use crate::dom::{query_first, HostDocument, MediaElement};
use crate::error::PipError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlIntent {
    PlayPause,
    Previous,
    Next,
    ToggleShuffle,
    ToggleRepeat,
    SeekToFraction(f64),
    SetVolume(f64),
    ToggleMute,
}

#[derive(Clone)]
pub struct ControlRelay {
    document: Arc<dyn HostDocument>,
    selectors: Arc<PlayerSelectors>,
}

impl ControlRelay {
    pub fn new(document: Arc<dyn HostDocument>, selectors: PlayerSelectors) -> Self {
        Self {
            document,
            selectors: Arc::new(selectors),
        }
    }

    /// Apply `intent`. Returns whether anything was done.
    pub fn apply(&self, intent: ControlIntent) -> bool {
        match self.try_apply(intent) {
            Ok(()) => {
                log::debug!("Relayed {:?}", intent);
                true
            }
            Err(PipError::ControlTargetMissing(target)) => {
                log::debug!("Skipping {:?}: {} not on the page", intent, target);
                false
            }
            Err(err) => {
                log::debug!("Skipping {:?}: {}", intent, err);
                false
            }
        }
    }

    fn try_apply(&self, intent: ControlIntent) -> Result<(), PipError> {
        match intent {
            ControlIntent::PlayPause => self.click(&self.selectors.play_pause, "play/pause button"),
            ControlIntent::Previous => self.click(&self.selectors.previous, "previous button"),
            ControlIntent::Next => self.click(&self.selectors.next, "next button"),
            ControlIntent::ToggleShuffle => self.click(&self.selectors.shuffle, "shuffle button"),
            ControlIntent::ToggleRepeat => self.click(&self.selectors.repeat, "repeat button"),
            ControlIntent::SeekToFraction(fraction) => self.seek_to_fraction(fraction),
            ControlIntent::SetVolume(volume) => self.set_volume(volume),
            ControlIntent::ToggleMute => {
                let media = self.media()?;
                media.set_muted(!media.muted());
                Ok(())
            }
        }
    }

    fn click(&self, selectors: &[String], target: &str) -> Result<(), PipError> {
        let element = query_first(self.document.as_ref(), selectors)
            .ok_or_else(|| PipError::ControlTargetMissing(target.to_string()))?;
        element.click();
        Ok(())
    }

    fn media(&self) -> Result<Arc<dyn MediaElement>, PipError> {
        self.document
            .media_element(&self.selectors.media)
            .ok_or_else(|| PipError::ControlTargetMissing("media element".to_string()))
    }

    fn seek_to_fraction(&self, fraction: f64) -> Result<(), PipError> {
        let media = self.media()?;
        let duration = media.duration();
        // Seeking means nothing until the duration is known.
        if !duration.is_finite() || duration <= 0.0 || fraction.is_nan() {
            return Ok(());
        }
        media.set_current_time(fraction.clamp(0.0, 1.0) * duration);
        Ok(())
    }

    fn set_volume(&self, volume: f64) -> Result<(), PipError> {
        if volume.is_nan() {
            return Ok(());
        }
        let media = self.media()?;
        let volume = volume.clamp(0.0, 1.0);
        media.set_volume(volume);
        if volume > 0.0 {
            media.set_muted(false);
        }
        Ok(())
    }
}
