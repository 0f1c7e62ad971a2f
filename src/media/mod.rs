//! Reading from and acting on the primary player surface.
//!
//! - `snapshot`: point-in-time reads of playback state
//! - `extractors`: pluggable strategies for shuffle/repeat "active" state
//! - `controller`: relays control intents to the primary surface

mod controller;
mod extractors;
mod snapshot;

pub use controller::{ControlIntent, ControlRelay};
pub use extractors::{AriaLabelExtractor, AriaPressedExtractor, ToggleStateExtractor};
pub use snapshot::{MediaSnapshot, PlaybackSnapshot, SnapshotReader};
