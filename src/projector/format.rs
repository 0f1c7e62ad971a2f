use once_cell::sync::Lazy;
use regex::Regex;

/// `w60-h60`-style size token embedded in artwork URLs.
static SIZE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"w\d+-h\d+").expect("valid size token regex"));

/// `minutes:seconds`, seconds zero-padded. Total over all inputs.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Progress bar width in percent; 0 whenever the duration is unknown.
pub fn progress_percent(current: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !current.is_finite() {
        return 0.0;
    }
    (current / duration * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    High,
}

impl VolumeLevel {
    pub fn from_media(volume: f64, muted: bool) -> Self {
        if muted || volume <= 0.0 || volume.is_nan() {
            VolumeLevel::Muted
        } else if volume < 0.5 {
            VolumeLevel::Low
        } else {
            VolumeLevel::High
        }
    }
}

/// Slider position (0..100) shown for the media's volume.
pub fn slider_value(volume: f64, muted: bool) -> f64 {
    if muted || volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0) * 100.0
    }
}

/// Ask for a `size`x`size` variant of a thumbnail URL. URLs without a size
/// token are returned unchanged.
pub fn upscale_artwork_url(url: &str, size: u32) -> String {
    SIZE_TOKEN
        .replace(url, format!("w{size}-h{size}").as_str())
        .into_owned()
}
