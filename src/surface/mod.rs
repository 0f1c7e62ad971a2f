//! Boundary to the secondary, always-on-top floating surface.

pub mod markup;

use async_trait::async_trait;
use std::sync::Arc;

use crate::dom::Listener;
use crate::error::PipError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEventKind {
    Click,
    Input,
}

/// Pointer position relative to the clicked element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub client_x: f64,
    pub left: f64,
    pub width: f64,
}

impl PointerPosition {
    /// Horizontal position as a fraction in [0, 1]; `None` for an empty box.
    pub fn fraction(&self) -> Option<f64> {
        if !(self.width > 0.0) || !self.client_x.is_finite() || !self.left.is_finite() {
            return None;
        }
        Some(((self.client_x - self.left) / self.width).clamp(0.0, 1.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    Click { pointer: Option<PointerPosition> },
    /// Range inputs report their raw value (0..100 for the volume slider).
    Input { value: f64 },
}

pub type EventHandler = Arc<dyn Fn(UiEvent) + Send + Sync>;

/// Creates rich floating surfaces.
#[async_trait]
pub trait FloatingSurfaceHost: Send + Sync {
    fn supports_rich_surface(&self) -> bool;
    /// May suspend until the surface is ready.
    async fn request_window(&self, width: u32, height: u32) -> Result<Arc<dyn FloatingWindow>, PipError>;
}

/// An open floating surface. Nodes are addressed by element id.
///
/// Writes to ids that do not exist are ignored by implementations.
pub trait FloatingWindow: Send + Sync {
    fn append_style(&self, css: &str);
    fn append_stylesheet_link(&self, href: &str);
    fn mount(&self, body_html: &str) -> Result<(), PipError>;

    fn add_listener(&self, element_id: &str, kind: UiEventKind, handler: EventHandler) -> bool;
    /// Fires when the surface goes away, whoever closed it.
    fn on_page_hide(&self, listener: Listener);

    fn set_text(&self, element_id: &str, text: &str);
    fn set_title(&self, element_id: &str, title: &str);
    fn image_src(&self, element_id: &str) -> Option<String>;
    fn set_image_src(&self, element_id: &str, src: &str);
    fn set_background_image(&self, element_id: &str, url: &str);
    fn set_inner_svg(&self, element_id: &str, markup: &str);
    fn set_width_percent(&self, element_id: &str, percent: f64);
    fn set_value(&self, element_id: &str, value: f64);
    fn toggle_class(&self, element_id: &str, class_name: &str, enabled: bool);

    fn close(&self);
}
