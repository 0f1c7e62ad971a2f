//! Stylesheet, body markup and icon paths injected into the floating surface.

use crate::config::Labels;

pub const BG_LAYER: &str = "bgLayer";
pub const CLOSE_BTN: &str = "closeBtn";
pub const ALBUM_ART: &str = "albumArt";
pub const TRACK_TITLE: &str = "trackTitle";
pub const TRACK_ARTIST: &str = "trackArtist";
pub const PROGRESS_CONTAINER: &str = "progressContainer";
pub const PROGRESS_BAR: &str = "progressBar";
pub const CURRENT_TIME: &str = "currentTime";
pub const TOTAL_TIME: &str = "totalTime";
pub const VOLUME_SLIDER: &str = "volumeSlider";
pub const VOLUME_BTN: &str = "volumeBtn";
pub const VOLUME_ICON: &str = "volumeIcon";
pub const SHUFFLE_BTN: &str = "shuffleBtn";
pub const PREV_BTN: &str = "prevBtn";
pub const PLAY_PAUSE_BTN: &str = "playPauseBtn";
pub const PLAY_ICON: &str = "playIcon";
pub const NEXT_BTN: &str = "nextBtn";
pub const REPEAT_BTN: &str = "repeatBtn";

pub const ACTIVE_CLASS: &str = "active";

pub const PLAY_PATH: &str = r#"<path d="M8 5v14l11-7z"/>"#;
pub const PAUSE_PATH: &str = r#"<path d="M6 19h4V5H6v14zm8-14v14h4V5h-4z"/>"#;

pub const VOLUME_MUTED_PATH: &str = r#"<path d="M16.5 12c0-1.77-1.02-3.29-2.5-4.03v2.21l2.45 2.45c.03-.2.05-.41.05-.63zm2.5 0c0 .94-.2 1.82-.54 2.64l1.51 1.51C20.63 14.91 21 13.5 21 12c0-4.28-2.99-7.86-7-8.77v2.06c2.89.86 5 3.54 5 6.71zM4.27 3L3 4.27 7.73 9H3v6h4l5 5v-6.73l4.25 4.25c-.67.52-1.42.93-2.25 1.18v2.06c1.38-.31 2.63-.95 3.69-1.81L19.73 21 21 19.73l-9-9L4.27 3zM12 4L9.91 6.09 12 8.18V4z"/>"#;
pub const VOLUME_LOW_PATH: &str = r#"<path d="M7 9v6h4l5 5V4l-5 5H7z"/><path d="M16.5 12c0-1.77-1.02-3.29-2.5-4.03v8.05c1.48-.73 2.5-2.25 2.5-4.02z"/>"#;
pub const VOLUME_HIGH_PATH: &str = r#"<path d="M3 9v6h4l5 5V4L7 9H3zm13.5 3c0-1.77-1.02-3.29-2.5-4.03v8.05c1.48-.73 2.5-2.25 2.5-4.02zM14 3.23v2.06c2.89.86 5 3.54 5 6.71s-2.11 5.85-5 6.71v2.06c4.01-.91 7-4.49 7-8.77s-2.99-7.86-7-8.77z"/>"#;

const CLOSE_PATH: &str = r#"<path d="M19 6.41L17.59 5 12 10.59 6.41 5 5 6.41 10.59 12 5 17.59 6.41 19 12 13.41 17.59 19 19 17.59 13.41 12z"/>"#;
const SHUFFLE_PATH: &str = r#"<path d="M10.59 9.17L5.41 4 4 5.41l5.17 5.17 1.42-1.41zM14.5 4l2.04 2.04L4 18.59 5.41 20 17.96 7.46 20 9.5V4h-5.5zm.33 9.41l-1.41 1.41 3.13 3.13L14.5 20H20v-5.5l-2.04 2.04-3.13-3.13z"/>"#;
const PREV_PATH: &str = r#"<path d="M6 6h2v12H6zm3.5 6l8.5 6V6z"/>"#;
const NEXT_PATH: &str = r#"<path d="M6 18l8.5-6L6 6v12zM16 6v12h2V6h-2z"/>"#;
const REPEAT_PATH: &str = r#"<path d="M7 7h10v3l4-4-4-4v3H5v6h2V7zm10 10H7v-3l-4 4 4 4v-3h12v-6h-2v4z"/>"#;

/// Icon of the launcher button placed in the primary player bar.
pub const LAUNCHER_ICON: &str = r#"<svg viewBox="0 0 24 24" width="24" height="24" fill="currentColor"><path d="M19 7h-8v6h8V7zm2-4H3c-1.1 0-2 .9-2 2v14c0 1.1.9 2 2 2h18c1.1 0 2-.9 2-2V5c0-1.1-.9-2-2-2zm0 16H3V5h18v14z"/></svg>"#;

pub const PIP_STYLES: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }

body {
  font-family: 'Noto Sans KR', 'Roboto', sans-serif;
  background: #0f0f0f;
  color: #fff;
  height: 100vh;
  overflow: hidden;
  user-select: none;
  position: relative;
}

.bg-layer {
  position: absolute;
  inset: -20px;
  background-size: cover;
  background-position: center;
  filter: blur(24px) brightness(0.7);
  transform: scale(1.1);
  z-index: 0;
  transition: background-image 0.4s ease;
}

.bg-overlay {
  position: absolute;
  inset: 0;
  background: linear-gradient(180deg, rgba(0, 0, 0, 0.4) 0%, rgba(0, 0, 0, 0.6) 50%, rgba(0, 0, 0, 0.75) 100%);
  z-index: 1;
}

.pip-container {
  position: relative;
  z-index: 2;
  display: flex;
  flex-direction: column;
  justify-content: space-between;
  height: 100%;
  padding: 16px;
  gap: 10px;
}

.close-btn {
  position: absolute;
  top: 8px;
  right: 8px;
  width: 28px;
  height: 28px;
  border: none;
  border-radius: 50%;
  background: rgba(255, 255, 255, 0.1);
  color: #fff;
  cursor: pointer;
  display: flex;
  align-items: center;
  justify-content: center;
}
.close-btn:hover { background: rgba(255, 255, 255, 0.25); }
.close-btn svg { width: 16px; height: 16px; fill: currentColor; }

.album-section { display: flex; align-items: center; gap: 14px; min-width: 0; padding-right: 32px; }
.album-art {
  width: 72px;
  height: 72px;
  border-radius: 8px;
  object-fit: cover;
  box-shadow: 0 4px 16px rgba(0, 0, 0, 0.5);
  flex-shrink: 0;
}
.track-info { min-width: 0; }
.track-title, .track-artist { white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
.track-title { font-size: 16px; font-weight: 700; }
.track-artist { font-size: 13px; color: rgba(255, 255, 255, 0.7); margin-top: 4px; }

.progress-bar-container {
  width: 100%;
  height: 4px;
  background: rgba(255, 255, 255, 0.2);
  border-radius: 2px;
  cursor: pointer;
}
.progress-bar-container:hover { height: 6px; }
.progress-bar { height: 100%; width: 0%; background: #ff0033; border-radius: 2px; }

.time-display {
  display: flex;
  justify-content: space-between;
  align-items: center;
  margin-top: 6px;
  font-size: 12px;
  color: rgba(255, 255, 255, 0.7);
}
.time-left { display: flex; gap: 4px; }

.volume-control { display: flex; align-items: center; gap: 6px; }
.volume-slider { width: 80px; accent-color: #fff; cursor: pointer; }
.volume-btn { background: none; border: none; color: #fff; cursor: pointer; display: flex; }
.volume-btn svg { width: 18px; height: 18px; fill: currentColor; }

.controls-section { display: flex; justify-content: center; align-items: center; gap: 14px; }
.control-btn {
  width: 40px;
  height: 40px;
  border: none;
  border-radius: 50%;
  background: transparent;
  color: #fff;
  cursor: pointer;
  display: flex;
  align-items: center;
  justify-content: center;
  transition: background 0.2s ease, transform 0.1s ease;
}
.control-btn:hover { background: rgba(255, 255, 255, 0.15); }
.control-btn:active { transform: scale(0.92); }
.control-btn svg { width: 24px; height: 24px; fill: currentColor; }
.control-btn.small { width: 32px; height: 32px; color: rgba(255, 255, 255, 0.6); }
.control-btn.small svg { width: 18px; height: 18px; }
.control-btn.play-pause { width: 52px; height: 52px; background: #fff; color: #000; }
.control-btn.play-pause svg { width: 30px; height: 30px; }

.shuffle-btn.active { color: #3ea6ff; }
.repeat-btn.active { color: #ffb74d; }

@media (max-height: 260px) {
  .pip-container { padding: 12px; gap: 6px; }
  .album-art { width: 56px; height: 56px; }
  .control-btn.play-pause { width: 44px; height: 44px; }
}

@media (max-height: 180px) {
  .pip-container { flex-direction: row; align-items: center; padding: 8px 40px 8px 8px; }
  .album-art { width: 44px; height: 44px; }
  .track-artist, .progress-section { display: none; }
  .control-btn.small { display: none; }
  .controls-section { gap: 6px; }
}

@media (max-width: 360px) {
  .volume-slider { width: 56px; }
  .time-display { font-size: 11px; }
}
"#;

/// Body markup of the floating surface.
pub fn pip_body(labels: &Labels) -> String {
    let no_track = escape_html(&labels.no_track);
    let artist = escape_html(&labels.unknown_artist);

    format!(
        r#"<div class="bg-layer" id="{BG_LAYER}"></div>
<div class="bg-overlay"></div>
<div class="pip-container">
  <button class="close-btn" id="{CLOSE_BTN}"><svg viewBox="0 0 24 24">{CLOSE_PATH}</svg></button>
  <div class="album-section">
    <img class="album-art" id="{ALBUM_ART}" src="" alt="Album Art">
    <div class="track-info">
      <div class="track-title" id="{TRACK_TITLE}">{no_track}</div>
      <div class="track-artist" id="{TRACK_ARTIST}">{artist}</div>
    </div>
  </div>
  <div class="progress-section">
    <div class="progress-bar-container" id="{PROGRESS_CONTAINER}">
      <div class="progress-bar" id="{PROGRESS_BAR}"></div>
    </div>
    <div class="time-display">
      <div class="time-left">
        <span id="{CURRENT_TIME}">0:00</span>
        <span>/</span>
        <span id="{TOTAL_TIME}">0:00</span>
      </div>
      <div class="volume-control">
        <input type="range" class="volume-slider" id="{VOLUME_SLIDER}" min="0" max="100" value="100">
        <button class="volume-btn" id="{VOLUME_BTN}" title="Volume"><svg viewBox="0 0 24 24" id="{VOLUME_ICON}">{VOLUME_HIGH_PATH}</svg></button>
      </div>
    </div>
  </div>
  <div class="controls-section">
    <button class="control-btn small shuffle-btn" id="{SHUFFLE_BTN}" title="Shuffle"><svg viewBox="0 0 24 24">{SHUFFLE_PATH}</svg></button>
    <button class="control-btn" id="{PREV_BTN}" title="Previous"><svg viewBox="0 0 24 24">{PREV_PATH}</svg></button>
    <button class="control-btn play-pause" id="{PLAY_PAUSE_BTN}" title="Play/Pause"><svg viewBox="0 0 24 24" id="{PLAY_ICON}">{PLAY_PATH}</svg></button>
    <button class="control-btn" id="{NEXT_BTN}" title="Next"><svg viewBox="0 0 24 24">{NEXT_PATH}</svg></button>
    <button class="control-btn small repeat-btn" id="{REPEAT_BTN}" title="Repeat"><svg viewBox="0 0 24 24">{REPEAT_PATH}</svg></button>
  </div>
</div>"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
