use crate::dom::{query_first, HostDocument};

/// Reads whether a mode toggle (shuffle, repeat) is on from the primary surface.
///
/// The primary surface exposes no dedicated state for these, only accessibility
/// attributes, so each control gets its own strategy.
pub trait ToggleStateExtractor: Send + Sync {
    /// `None` when the control is not on the page.
    fn is_active(&self, document: &dyn HostDocument) -> Option<bool>;
}

/// On when `aria-pressed="true"`.
pub struct AriaPressedExtractor {
    selectors: Vec<String>,
}

impl AriaPressedExtractor {
    pub fn new(selectors: Vec<String>) -> Self {
        Self { selectors }
    }
}

impl ToggleStateExtractor for AriaPressedExtractor {
    fn is_active(&self, document: &dyn HostDocument) -> Option<bool> {
        let element = query_first(document, &self.selectors)?;
        Some(element.attribute("aria-pressed").as_deref() == Some("true"))
    }
}

/// On unless the `aria-label` mentions the off marker (case-insensitive).
pub struct AriaLabelExtractor {
    selectors: Vec<String>,
    off_marker: String,
}

impl AriaLabelExtractor {
    pub fn new(selectors: Vec<String>, off_marker: impl Into<String>) -> Self {
        Self {
            selectors,
            off_marker: off_marker.into().to_lowercase(),
        }
    }
}

impl ToggleStateExtractor for AriaLabelExtractor {
    fn is_active(&self, document: &dyn HostDocument) -> Option<bool> {
        let element = query_first(document, &self.selectors)?;
        let label = element.attribute("aria-label").unwrap_or_default();
        Some(!label.to_lowercase().contains(&self.off_marker))
    }
}
