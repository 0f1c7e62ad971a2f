//! Boundary to the host document that carries the primary player surface.
//!
//! The engine never touches a concrete DOM. Hosts implement these traits over
//! whatever they embed (a browser bridge, a webview, or the in-memory fakes the
//! tests use).

mod mutation;

pub use mutation::{MutationHub, MutationObserver};

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::PipError;

/// Callback without payload (page hide, picture-in-picture left, button click).
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// A node in the primary surface.
#[cfg_attr(test, mockall::automock)]
pub trait Element: Send + Sync {
    fn text_content(&self) -> Option<String>;
    fn attribute(&self, name: &str) -> Option<String>;
    /// Native activation, equivalent to a user click.
    fn click(&self);
}

/// The single media element backing playback.
#[async_trait]
pub trait MediaElement: Send + Sync {
    fn paused(&self) -> bool;
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// May be NaN while metadata is still loading.
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);

    /// Primitive single-element floating presentation.
    async fn request_picture_in_picture(&self) -> Result<(), PipError>;
    fn on_leave_picture_in_picture(&self, listener: Listener);
}

/// Toggle button injected into the primary surface's controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherButton {
    pub class_name: String,
    pub title: String,
    pub icon_svg: String,
}

#[async_trait]
pub trait HostDocument: Send + Sync {
    fn query_selector(&self, selector: &str) -> Option<Arc<dyn Element>>;
    fn media_element(&self, selector: &str) -> Option<Arc<dyn MediaElement>>;

    /// Subtree-wide observation of the document body.
    fn observe_mutations(&self) -> MutationObserver;

    /// Whether some element is currently in primitive picture-in-picture.
    fn picture_in_picture_active(&self) -> bool;
    async fn exit_picture_in_picture(&self) -> Result<(), PipError>;

    /// Insert `button` as the first child of the node matching `container`.
    /// Returns false when the container is missing.
    fn prepend_button(&self, container: &str, button: &LauncherButton, on_click: Listener) -> bool;

    /// Remove the launcher carrying `class_name`. Returns false when none is present.
    fn remove_button(&self, class_name: &str) -> bool;

    /// Blocking notice to the end user.
    fn alert(&self, message: &str);
}

/// Resolve the first candidate selector that matches.
pub fn query_first(document: &dyn HostDocument, selectors: &[String]) -> Option<Arc<dyn Element>> {
    selectors
        .iter()
        .find_map(|selector| document.query_selector(selector))
}
