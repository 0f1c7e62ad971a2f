//! In-memory host document, media element and floating surface used by tests.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::PlayerSelectors;
use crate::dom::{Element, HostDocument, LauncherButton, Listener, MediaElement, MutationHub, MutationObserver};
use crate::error::PipError;
use crate::surface::{EventHandler, FloatingSurfaceHost, FloatingWindow, PointerPosition, UiEvent, UiEventKind};

static ELEMENT_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r#"id="([^"]+)""#).unwrap());

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Primary surface
// ============================================================================

#[derive(Default)]
pub struct FakeElement {
    text: Mutex<String>,
    attributes: Mutex<HashMap<String, String>>,
    clicks: AtomicUsize,
    on_click: Mutex<Option<Listener>>,
}

impl FakeElement {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_text(self: Arc<Self>, text: &str) -> Arc<Self> {
        self.set_text(text);
        self
    }

    pub fn with_attribute(self: Arc<Self>, name: &str, value: &str) -> Arc<Self> {
        self.set_attribute(name, value);
        self
    }

    pub fn set_text(&self, text: &str) {
        *lock(&self.text) = text.to_string();
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        lock(&self.attributes).insert(name.to_string(), value.to_string());
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }
}

impl Element for FakeElement {
    fn text_content(&self) -> Option<String> {
        Some(lock(&self.text).clone())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        lock(&self.attributes).get(name).cloned()
    }

    fn click(&self) {
        self.clicks.fetch_add(1, Ordering::SeqCst);
        let listener = lock(&self.on_click).clone();
        if let Some(listener) = listener {
            listener();
        }
    }
}

struct MediaState {
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    in_pip: bool,
    fail_pip: bool,
}

pub struct FakeMedia {
    state: Mutex<MediaState>,
    leave_listeners: Mutex<Vec<Listener>>,
    pip_requests: AtomicUsize,
}

impl FakeMedia {
    /// Paused at 0 with metadata not loaded yet.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MediaState {
                paused: true,
                current_time: 0.0,
                duration: f64::NAN,
                volume: 1.0,
                muted: false,
                in_pip: false,
                fail_pip: false,
            }),
            leave_listeners: Mutex::new(Vec::new()),
            pip_requests: AtomicUsize::new(0),
        })
    }

    pub fn set_state(&self, paused: bool, current_time: f64, duration: f64) {
        let mut state = lock(&self.state);
        state.paused = paused;
        state.current_time = current_time;
        state.duration = duration;
    }

    pub fn fail_picture_in_picture(&self) {
        lock(&self.state).fail_pip = true;
    }

    pub fn pip_requests(&self) -> usize {
        self.pip_requests.load(Ordering::SeqCst)
    }

    pub fn leave_listener_count(&self) -> usize {
        lock(&self.leave_listeners).len()
    }

    pub fn in_picture_in_picture(&self) -> bool {
        lock(&self.state).in_pip
    }

    /// Leave primitive picture-in-picture, as the browser does when the user closes it.
    pub fn leave_picture_in_picture(&self) {
        {
            let mut state = lock(&self.state);
            if !state.in_pip {
                return;
            }
            state.in_pip = false;
        }
        let listeners = lock(&self.leave_listeners).clone();
        for listener in listeners {
            listener();
        }
    }
}

#[async_trait]
impl MediaElement for FakeMedia {
    fn paused(&self) -> bool {
        lock(&self.state).paused
    }

    fn current_time(&self) -> f64 {
        lock(&self.state).current_time
    }

    fn set_current_time(&self, seconds: f64) {
        lock(&self.state).current_time = seconds;
    }

    fn duration(&self) -> f64 {
        lock(&self.state).duration
    }

    fn volume(&self) -> f64 {
        lock(&self.state).volume
    }

    fn set_volume(&self, volume: f64) {
        lock(&self.state).volume = volume;
    }

    fn muted(&self) -> bool {
        lock(&self.state).muted
    }

    fn set_muted(&self, muted: bool) {
        lock(&self.state).muted = muted;
    }

    async fn request_picture_in_picture(&self) -> Result<(), PipError> {
        self.pip_requests.fetch_add(1, Ordering::SeqCst);
        let mut state = lock(&self.state);
        if state.fail_pip {
            return Err(PipError::FallbackFailed("not allowed".to_string()));
        }
        state.in_pip = true;
        Ok(())
    }

    fn on_leave_picture_in_picture(&self, listener: Listener) {
        lock(&self.leave_listeners).push(listener);
    }
}

#[derive(Default)]
pub struct FakeDocument {
    nodes: Mutex<HashMap<String, Arc<dyn Element>>>,
    media: Mutex<Option<Arc<FakeMedia>>>,
    hub: MutationHub,
    ambient_pip: AtomicBool,
    alerts: Mutex<Vec<String>>,
    launchers: Mutex<Vec<(String, LauncherButton)>>,
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mounted player bar with controls, shuffle off and repeat off.
    pub fn with_player_bar() -> Self {
        let document = Self::new();
        let selectors = PlayerSelectors::default();
        document.insert(&selectors.player_bar, FakeElement::new());
        document.insert(&selectors.launcher_container, FakeElement::new());
        document.insert(&selectors.play_pause[0], FakeElement::new());
        document.insert(&selectors.previous[0], FakeElement::new());
        document.insert(&selectors.next[0], FakeElement::new());
        document.insert(
            &selectors.shuffle[0],
            FakeElement::new().with_attribute("aria-pressed", "false"),
        );
        document.insert(
            &selectors.repeat[0],
            FakeElement::new().with_attribute("aria-label", "Repeat off"),
        );
        document
    }

    pub fn insert(&self, selector: &str, element: Arc<FakeElement>) {
        self.insert_dyn(selector, element);
    }

    pub fn insert_dyn(&self, selector: &str, element: Arc<dyn Element>) {
        lock(&self.nodes).insert(selector.to_string(), element);
        self.hub.notify();
    }

    pub fn remove(&self, selector: &str) {
        lock(&self.nodes).remove(selector);
        self.hub.notify();
    }

    pub fn set_media(&self, media: Arc<FakeMedia>) {
        *lock(&self.media) = Some(media);
        self.hub.notify();
    }

    /// Some other element is in primitive picture-in-picture.
    pub fn set_ambient_pip(&self, active: bool) {
        self.ambient_pip.store(active, Ordering::SeqCst);
    }

    /// Touch the tree without changing what any selector matches.
    pub fn mutate(&self) {
        self.hub.notify();
    }

    pub fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }

    pub fn launchers(&self) -> Vec<(String, LauncherButton)> {
        lock(&self.launchers).clone()
    }

    pub fn observer_count(&self) -> usize {
        self.hub.observer_count()
    }

    fn fake_media(&self) -> Option<Arc<FakeMedia>> {
        lock(&self.media).clone()
    }
}

#[async_trait]
impl HostDocument for FakeDocument {
    fn query_selector(&self, selector: &str) -> Option<Arc<dyn Element>> {
        lock(&self.nodes).get(selector).cloned()
    }

    fn media_element(&self, _selector: &str) -> Option<Arc<dyn MediaElement>> {
        self.fake_media().map(|media| media as Arc<dyn MediaElement>)
    }

    fn observe_mutations(&self) -> MutationObserver {
        self.hub.observe()
    }

    fn picture_in_picture_active(&self) -> bool {
        self.ambient_pip.load(Ordering::SeqCst)
            || self
                .fake_media()
                .is_some_and(|media| media.in_picture_in_picture())
    }

    async fn exit_picture_in_picture(&self) -> Result<(), PipError> {
        self.ambient_pip.store(false, Ordering::SeqCst);
        if let Some(media) = self.fake_media() {
            media.leave_picture_in_picture();
        }
        Ok(())
    }

    fn prepend_button(&self, container: &str, button: &LauncherButton, on_click: Listener) -> bool {
        if self.query_selector(container).is_none() {
            return false;
        }
        lock(&self.launchers).push((container.to_string(), button.clone()));

        let element = FakeElement::new();
        *lock(&element.on_click) = Some(on_click);
        self.insert(&format!(".{}", button.class_name), element);
        true
    }

    fn remove_button(&self, class_name: &str) -> bool {
        let removed = lock(&self.nodes).remove(&format!(".{}", class_name)).is_some();
        lock(&self.launchers).retain(|(_, button)| button.class_name != class_name);
        if removed {
            self.hub.notify();
        }
        removed
    }

    fn alert(&self, message: &str) {
        lock(&self.alerts).push(message.to_string());
    }
}

// ============================================================================
// Floating surface
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct NodeState {
    pub text: Option<String>,
    pub title: Option<String>,
    pub src: Option<String>,
    pub background: Option<String>,
    pub svg: Option<String>,
    pub width_percent: Option<f64>,
    pub value: Option<f64>,
    pub classes: HashSet<String>,
}

#[derive(Default)]
struct WindowInner {
    styles: Vec<String>,
    links: Vec<String>,
    body: Option<String>,
    nodes: HashMap<String, NodeState>,
    listeners: HashMap<(String, UiEventKind), Vec<EventHandler>>,
    page_hide: Vec<Listener>,
    closed: bool,
    src_writes: usize,
}

pub struct FakeWindow {
    inner: Mutex<WindowInner>,
    fail_mount: bool,
}

impl FakeWindow {
    pub fn new(fail_mount: bool) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(WindowInner::default()),
            fail_mount,
        })
    }

    pub fn node(&self, element_id: &str) -> Option<NodeState> {
        lock(&self.inner).nodes.get(element_id).cloned()
    }

    pub fn text(&self, element_id: &str) -> Option<String> {
        self.node(element_id).and_then(|node| node.text)
    }

    pub fn has_class(&self, element_id: &str, class_name: &str) -> bool {
        self.node(element_id)
            .is_some_and(|node| node.classes.contains(class_name))
    }

    pub fn styles(&self) -> Vec<String> {
        lock(&self.inner).styles.clone()
    }

    pub fn links(&self) -> Vec<String> {
        lock(&self.inner).links.clone()
    }

    pub fn body(&self) -> Option<String> {
        lock(&self.inner).body.clone()
    }

    pub fn src_writes(&self) -> usize {
        lock(&self.inner).src_writes
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }

    pub fn click(&self, element_id: &str) {
        self.dispatch(element_id, UiEventKind::Click, UiEvent::Click { pointer: None });
    }

    pub fn click_at(&self, element_id: &str, pointer: PointerPosition) {
        self.dispatch(
            element_id,
            UiEventKind::Click,
            UiEvent::Click {
                pointer: Some(pointer),
            },
        );
    }

    pub fn input(&self, element_id: &str, value: f64) {
        self.dispatch(element_id, UiEventKind::Input, UiEvent::Input { value });
    }

    /// The user closes the surface with the host's own window controls.
    pub fn user_close(&self) {
        self.close();
    }

    fn dispatch(&self, element_id: &str, kind: UiEventKind, event: UiEvent) {
        let handlers = {
            let inner = lock(&self.inner);
            if inner.closed {
                return;
            }
            inner
                .listeners
                .get(&(element_id.to_string(), kind))
                .cloned()
                .unwrap_or_default()
        };
        for handler in handlers {
            handler(event);
        }
    }

    fn with_node(&self, element_id: &str, update: impl FnOnce(&mut NodeState)) {
        let mut inner = lock(&self.inner);
        if let Some(node) = inner.nodes.get_mut(element_id) {
            update(node);
        }
    }
}

impl FloatingWindow for FakeWindow {
    fn append_style(&self, css: &str) {
        lock(&self.inner).styles.push(css.to_string());
    }

    fn append_stylesheet_link(&self, href: &str) {
        lock(&self.inner).links.push(href.to_string());
    }

    fn mount(&self, body_html: &str) -> Result<(), PipError> {
        if self.fail_mount {
            return Err(PipError::SurfaceCreation("document not writable".to_string()));
        }
        let mut inner = lock(&self.inner);
        for capture in ELEMENT_ID.captures_iter(body_html) {
            inner.nodes.entry(capture[1].to_string()).or_default();
        }
        inner.body = Some(body_html.to_string());
        Ok(())
    }

    fn add_listener(&self, element_id: &str, kind: UiEventKind, handler: EventHandler) -> bool {
        let mut inner = lock(&self.inner);
        if !inner.nodes.contains_key(element_id) {
            return false;
        }
        inner
            .listeners
            .entry((element_id.to_string(), kind))
            .or_default()
            .push(handler);
        true
    }

    fn on_page_hide(&self, listener: Listener) {
        lock(&self.inner).page_hide.push(listener);
    }

    fn set_text(&self, element_id: &str, text: &str) {
        self.with_node(element_id, |node| node.text = Some(text.to_string()));
    }

    fn set_title(&self, element_id: &str, title: &str) {
        self.with_node(element_id, |node| node.title = Some(title.to_string()));
    }

    fn image_src(&self, element_id: &str) -> Option<String> {
        self.node(element_id).and_then(|node| node.src)
    }

    fn set_image_src(&self, element_id: &str, src: &str) {
        let mut inner = lock(&self.inner);
        if let Some(node) = inner.nodes.get_mut(element_id) {
            node.src = Some(src.to_string());
            inner.src_writes += 1;
        }
    }

    fn set_background_image(&self, element_id: &str, url: &str) {
        self.with_node(element_id, |node| node.background = Some(url.to_string()));
    }

    fn set_inner_svg(&self, element_id: &str, markup: &str) {
        self.with_node(element_id, |node| node.svg = Some(markup.to_string()));
    }

    fn set_width_percent(&self, element_id: &str, percent: f64) {
        self.with_node(element_id, |node| node.width_percent = Some(percent));
    }

    fn set_value(&self, element_id: &str, value: f64) {
        self.with_node(element_id, |node| node.value = Some(value));
    }

    fn toggle_class(&self, element_id: &str, class_name: &str, enabled: bool) {
        self.with_node(element_id, |node| {
            if enabled {
                node.classes.insert(class_name.to_string());
            } else {
                node.classes.remove(class_name);
            }
        });
    }

    fn close(&self) {
        let listeners = {
            let mut inner = lock(&self.inner);
            if inner.closed {
                return;
            }
            inner.closed = true;
            std::mem::take(&mut inner.page_hide)
        };
        for listener in listeners {
            listener();
        }
    }
}

pub struct FakeSurfaceHost {
    supported: bool,
    fail_requests: bool,
    fail_mount: bool,
    delay: Option<Duration>,
    windows: Mutex<Vec<Arc<FakeWindow>>>,
}

impl FakeSurfaceHost {
    pub fn new() -> Self {
        Self {
            supported: true,
            fail_requests: false,
            fail_mount: false,
            delay: None,
            windows: Mutex::new(Vec::new()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_requests: true,
            ..Self::new()
        }
    }

    pub fn failing_mount() -> Self {
        Self {
            fail_mount: true,
            ..Self::new()
        }
    }

    /// Surfaces take `delay` to become ready.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn windows(&self) -> Vec<Arc<FakeWindow>> {
        lock(&self.windows).clone()
    }

    pub fn last_window(&self) -> Option<Arc<FakeWindow>> {
        lock(&self.windows).last().cloned()
    }
}

#[async_trait]
impl FloatingSurfaceHost for FakeSurfaceHost {
    fn supports_rich_surface(&self) -> bool {
        self.supported
    }

    async fn request_window(&self, _width: u32, _height: u32) -> Result<Arc<dyn FloatingWindow>, PipError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_requests {
            return Err(PipError::SurfaceCreation("request rejected".to_string()));
        }
        let window = FakeWindow::new(self.fail_mount);
        lock(&self.windows).push(window.clone());
        Ok(window as Arc<dyn FloatingWindow>)
    }
}
