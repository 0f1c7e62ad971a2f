use serde::Serialize;
use std::sync::Arc;

use super::extractors::{AriaLabelExtractor, AriaPressedExtractor, ToggleStateExtractor};
use crate::config::PlayerSelectors;
use crate::dom::HostDocument;

/// Point-in-time read of the primary surface.
///
/// Fields are `None` when their source node is missing, so a render pass can
/// skip exactly that field and keep whatever was displayed before.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub artwork_url: Option<String>,
    pub media: Option<MediaSnapshot>,
    pub is_shuffle_on: Option<bool>,
    pub is_repeat_on: Option<bool>,
}

/// Playback properties of the media element.
///
/// `current_time_seconds <= duration_seconds` is not guaranteed and the
/// duration is NaN while unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSnapshot {
    pub is_paused: bool,
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
    pub volume: f64,
    pub is_muted: bool,
}

/// Builds snapshots from the host document.
pub struct SnapshotReader {
    document: Arc<dyn HostDocument>,
    selectors: PlayerSelectors,
    shuffle: Box<dyn ToggleStateExtractor>,
    repeat: Box<dyn ToggleStateExtractor>,
}

impl SnapshotReader {
    pub fn new(document: Arc<dyn HostDocument>, selectors: PlayerSelectors) -> Self {
        let shuffle = Box::new(AriaPressedExtractor::new(selectors.shuffle.clone()));
        let repeat = Box::new(AriaLabelExtractor::new(selectors.repeat.clone(), "off"));
        Self {
            document,
            selectors,
            shuffle,
            repeat,
        }
    }

    pub fn with_shuffle_extractor(mut self, extractor: Box<dyn ToggleStateExtractor>) -> Self {
        self.shuffle = extractor;
        self
    }

    pub fn with_repeat_extractor(mut self, extractor: Box<dyn ToggleStateExtractor>) -> Self {
        self.repeat = extractor;
        self
    }

    pub fn read(&self) -> PlaybackSnapshot {
        let document = self.document.as_ref();

        let text_of = |selector: &str| {
            document
                .query_selector(selector)
                .map(|element| element.text_content().unwrap_or_default())
        };

        let media = document
            .media_element(&self.selectors.media)
            .map(|media| MediaSnapshot {
                is_paused: media.paused(),
                current_time_seconds: media.current_time(),
                duration_seconds: media.duration(),
                volume: media.volume(),
                is_muted: media.muted(),
            });

        PlaybackSnapshot {
            title: text_of(&self.selectors.title),
            artist: text_of(&self.selectors.byline),
            artwork_url: document
                .query_selector(&self.selectors.artwork)
                .and_then(|image| image.attribute("src"))
                .filter(|src| !src.is_empty()),
            media,
            is_shuffle_on: self.shuffle.is_active(document),
            is_repeat_on: self.repeat.is_active(document),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fakes::{FakeDocument, FakeElement, FakeMedia};

    struct AlwaysOn;

    impl ToggleStateExtractor for AlwaysOn {
        fn is_active(&self, _document: &dyn HostDocument) -> Option<bool> {
            Some(true)
        }
    }

    #[test]
    fn test_empty_document_reads_nothing() {
        let document = Arc::new(FakeDocument::new());
        let reader = SnapshotReader::new(document, PlayerSelectors::default());
        assert_eq!(reader.read(), PlaybackSnapshot::default());
    }

    #[test]
    fn test_reads_populated_player() {
        let document = Arc::new(FakeDocument::with_player_bar());
        document.insert(
            "ytmusic-player-bar .title",
            FakeElement::new().with_text("Ditto"),
        );
        document.insert(
            "ytmusic-player-bar .byline",
            FakeElement::new().with_text("NewJeans"),
        );
        document.insert(
            "ytmusic-player-bar img.image",
            FakeElement::new().with_attribute("src", "https://lh3.example/a=w60-h60-l90"),
        );
        let media = FakeMedia::new();
        media.set_state(false, 42.0, 180.0);
        document.set_media(media);

        let reader = SnapshotReader::new(document, PlayerSelectors::default());
        let snapshot = reader.read();

        assert_eq!(snapshot.title.as_deref(), Some("Ditto"));
        assert_eq!(snapshot.artist.as_deref(), Some("NewJeans"));
        assert_eq!(
            snapshot.artwork_url.as_deref(),
            Some("https://lh3.example/a=w60-h60-l90")
        );
        let media = snapshot.media.unwrap();
        assert!(!media.is_paused);
        assert_eq!(media.current_time_seconds, 42.0);
        assert_eq!(media.duration_seconds, 180.0);
        assert_eq!(snapshot.is_shuffle_on, Some(false));
        assert_eq!(snapshot.is_repeat_on, Some(false));
    }

    #[test]
    fn test_extractors_are_pluggable() {
        let document = Arc::new(FakeDocument::new());
        let reader = SnapshotReader::new(document, PlayerSelectors::default())
            .with_shuffle_extractor(Box::new(AlwaysOn))
            .with_repeat_extractor(Box::new(AlwaysOn));

        let snapshot = reader.read();
        assert_eq!(snapshot.is_shuffle_on, Some(true));
        assert_eq!(snapshot.is_repeat_on, Some(true));
    }
}
