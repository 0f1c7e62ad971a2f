use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::PipConfig;
use crate::dom::{HostDocument, MediaElement};
use crate::error::PipError;
use crate::media::{ControlIntent, ControlRelay};
use crate::projector::StateProjector;
use crate::state_machine::{SessionState, SessionStateMachine};
use crate::surface::markup;
use crate::surface::{EventHandler, FloatingSurfaceHost, FloatingWindow, UiEvent, UiEventKind};
use crate::utils::logger::{log_operation, log_session_transition, LogContext, OperationPhase};

/// Exclusive owner of an open floating surface and its update timer.
struct FloatingSurfaceSession {
    id: u64,
    window: Arc<dyn FloatingWindow>,
    update_task: Option<JoinHandle<()>>,
}

impl FloatingSurfaceSession {
    /// Stop the timer and, unless the surface is already going away, close it.
    fn release(mut self, close_window: bool) {
        if let Some(task) = self.update_task.take() {
            task.abort();
        }
        if close_window {
            self.window.close();
        }
        log::debug!("Released floating surface session {}", self.id);
    }
}

#[derive(Default)]
struct SessionSlot {
    machine: SessionStateMachine,
    session: Option<FloatingSurfaceSession>,
    next_id: u64,
    /// Set by `close()` while an open is still pending.
    close_requested: bool,
    fallback_id: Option<u64>,
    /// Media element that already carries our leave-picture-in-picture listener.
    watched_media: Option<Weak<dyn MediaElement>>,
}

impl SessionSlot {
    fn is_watching(&self, media_key: usize) -> bool {
        self.watched_media.as_ref().is_some_and(|media| {
            media.strong_count() > 0 && Weak::as_ptr(media) as *const () as usize == media_key
        })
    }
}

enum Teardown {
    Nothing,
    Surface(FloatingSurfaceSession),
    Fallback,
}

/// Owns the floating surface lifecycle: `Closed -> Opening -> Open | FallbackOpen -> Closed`.
///
/// Cheap to clone; every clone drives the same session.
#[derive(Clone)]
pub struct FloatingWindowManager {
    inner: Arc<ManagerInner>,
}

/// Non-owning handle, used by listeners registered on host objects.
#[derive(Clone)]
pub struct WeakWindowManager {
    inner: Weak<ManagerInner>,
}

impl WeakWindowManager {
    pub fn upgrade(&self) -> Option<FloatingWindowManager> {
        self.inner
            .upgrade()
            .map(|inner| FloatingWindowManager { inner })
    }
}

struct ManagerInner {
    document: Arc<dyn HostDocument>,
    surfaces: Arc<dyn FloatingSurfaceHost>,
    config: PipConfig,
    relay: ControlRelay,
    projector: StateProjector,
    slot: Mutex<SessionSlot>,
    state_tx: watch::Sender<SessionState>,
}

impl FloatingWindowManager {
    pub fn new(
        document: Arc<dyn HostDocument>,
        surfaces: Arc<dyn FloatingSurfaceHost>,
        config: PipConfig,
    ) -> Self {
        let projector = StateProjector::new(document.clone(), &config);
        Self::with_projector(document, surfaces, config, projector)
    }

    pub fn with_projector(
        document: Arc<dyn HostDocument>,
        surfaces: Arc<dyn FloatingSurfaceHost>,
        config: PipConfig,
        projector: StateProjector,
    ) -> Self {
        let relay = ControlRelay::new(document.clone(), config.selectors.clone());
        let (state_tx, _) = watch::channel(SessionState::Closed);
        Self {
            inner: Arc::new(ManagerInner {
                document,
                surfaces,
                config,
                relay,
                projector,
                slot: Mutex::new(SessionSlot::default()),
                state_tx,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakWindowManager {
        WeakWindowManager {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock_slot().machine.current()
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock_slot().machine.is_active()
    }

    /// Watch session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// Open the rich floating surface, falling back to the media element's own
    /// picture-in-picture when the rich surface is unavailable or fails.
    ///
    /// Only valid from `Closed`; a second call while one is pending is rejected
    /// with [`PipError::OpenInProgress`].
    pub async fn open(&self) -> Result<SessionState, PipError> {
        let id = self.inner.begin_open()?;

        let mut context = LogContext {
            fields: HashMap::new(),
        };
        context.fields.insert("session".to_string(), id.to_string());
        log_operation("floating_surface.open", OperationPhase::Start, Some(&context));
        let started = Instant::now();

        let result = match self.inner.create_rich_surface(id).await {
            Ok(window) => Ok(self.inner.finish_open(id, window)),
            Err(err) => {
                log::warn!(
                    "Rich floating surface unavailable ({}), falling back to media picture-in-picture",
                    err
                );
                self.inner.open_fallback(id).await
            }
        };

        match &result {
            Ok(state) => {
                context
                    .fields
                    .insert("state".to_string(), format!("{:?}", state));
                log_operation(
                    "floating_surface.open",
                    OperationPhase::Complete {
                        duration_ms: started.elapsed().as_millis() as u64,
                    },
                    Some(&context),
                );
            }
            Err(err) => log_operation(
                "floating_surface.open",
                OperationPhase::Failed {
                    error: err.to_string(),
                },
                Some(&context),
            ),
        }

        result
    }

    /// Tear the session down. Closing a closed session is a no-op.
    pub async fn close(&self) {
        match self.inner.begin_close() {
            Teardown::Nothing => {}
            Teardown::Surface(session) => {
                log_session_transition("close", "Open", "Closed");
                session.release(true);
            }
            Teardown::Fallback => {
                log_session_transition("close", "FallbackOpen", "Closed");
                if self.inner.document.picture_in_picture_active() {
                    if let Err(err) = self.inner.document.exit_picture_in_picture().await {
                        log::warn!("Failed to leave media picture-in-picture: {}", err);
                    }
                }
            }
        }
    }

    /// `open()` when closed, otherwise `close()`.
    pub async fn toggle(&self) -> Result<SessionState, PipError> {
        let can_open = self.inner.lock_slot().machine.can_open();
        if can_open {
            self.open().await
        } else {
            self.close().await;
            Ok(self.state())
        }
    }
}

impl ManagerInner {
    fn lock_slot(&self) -> MutexGuard<'_, SessionSlot> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Recovering from poisoned mutex in FloatingWindowManager");
                poisoned.into_inner()
            }
        }
    }

    fn transition(&self, slot: &mut SessionSlot, to: SessionState) -> Result<(), PipError> {
        slot.machine.transition_to(to)?;
        self.state_tx.send_replace(to);
        Ok(())
    }

    fn begin_open(&self) -> Result<u64, PipError> {
        let mut slot = self.lock_slot();
        if slot.machine.current() == SessionState::Opening {
            log::warn!("[SESSION] open() while another open is pending, rejecting");
            return Err(PipError::OpenInProgress);
        }
        self.transition(&mut slot, SessionState::Opening)?;
        slot.next_id += 1;
        slot.close_requested = false;
        Ok(slot.next_id)
    }

    async fn create_rich_surface(
        self: &Arc<Self>,
        id: u64,
    ) -> Result<Arc<dyn FloatingWindow>, PipError> {
        if !self.surfaces.supports_rich_surface() {
            return Err(PipError::SurfaceUnsupported);
        }

        let size = &self.config.window;
        let window = self.surfaces.request_window(size.width, size.height).await?;

        if let Err(err) = self.inject_content(window.as_ref(), id) {
            window.close();
            return Err(err);
        }
        Ok(window)
    }

    fn inject_content(self: &Arc<Self>, window: &dyn FloatingWindow, id: u64) -> Result<(), PipError> {
        window.append_style(markup::PIP_STYLES);
        // Cosmetic only, loaded passively by the host.
        window.append_stylesheet_link(&self.config.font_stylesheet_url);
        window.mount(&markup::pip_body(&self.config.labels))?;

        self.wire_controls(window, id);

        // The user can close the surface natively; this is the only way back to Closed then.
        let weak = Arc::downgrade(self);
        window.on_page_hide(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.end_rich_session(id, false, "page hide");
            }
        }));
        Ok(())
    }

    fn wire_controls(self: &Arc<Self>, window: &dyn FloatingWindow, id: u64) {
        let buttons = [
            (markup::PLAY_PAUSE_BTN, ControlIntent::PlayPause),
            (markup::PREV_BTN, ControlIntent::Previous),
            (markup::NEXT_BTN, ControlIntent::Next),
            (markup::SHUFFLE_BTN, ControlIntent::ToggleShuffle),
            (markup::REPEAT_BTN, ControlIntent::ToggleRepeat),
            (markup::VOLUME_BTN, ControlIntent::ToggleMute),
        ];
        for (element_id, intent) in buttons {
            self.bind(window, element_id, UiEventKind::Click, move |_| Some(intent));
        }

        self.bind(window, markup::PROGRESS_CONTAINER, UiEventKind::Click, |event| match event {
            UiEvent::Click {
                pointer: Some(pointer),
            } => pointer.fraction().map(ControlIntent::SeekToFraction),
            _ => None,
        });
        self.bind(window, markup::VOLUME_SLIDER, UiEventKind::Input, |event| match event {
            UiEvent::Input { value } => Some(ControlIntent::SetVolume(value / 100.0)),
            _ => None,
        });

        let weak = Arc::downgrade(self);
        let close: EventHandler = Arc::new(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.end_rich_session(id, true, "close button");
            }
        });
        if !window.add_listener(markup::CLOSE_BTN, UiEventKind::Click, close) {
            log::warn!("Floating surface has no close button to bind");
        }
    }

    fn bind<F>(&self, window: &dyn FloatingWindow, element_id: &str, kind: UiEventKind, to_intent: F)
    where
        F: Fn(UiEvent) -> Option<ControlIntent> + Send + Sync + 'static,
    {
        let relay = self.relay.clone();
        let handler: EventHandler = Arc::new(move |event| {
            let Some(intent) = to_intent(event) else {
                return;
            };
            if catch_unwind(AssertUnwindSafe(|| relay.apply(intent))).is_err() {
                log::error!("Control relay panicked while applying {:?}", intent);
            }
        });
        if !window.add_listener(element_id, kind, handler) {
            log::warn!("Floating surface has no `{}` control to bind", element_id);
        }
    }

    fn finish_open(self: &Arc<Self>, id: u64, window: Arc<dyn FloatingWindow>) -> SessionState {
        let mut slot = self.lock_slot();
        if std::mem::take(&mut slot.close_requested) {
            if let Err(err) = self.transition(&mut slot, SessionState::Closed) {
                log::error!("[SESSION] {}", err);
            }
            drop(slot);
            log::info!("[SESSION] close() arrived while opening, discarding the new surface");
            window.close();
            return SessionState::Closed;
        }

        if let Err(err) = self.transition(&mut slot, SessionState::Open) {
            log::error!("[SESSION] Could not publish the new surface: {}", err);
            let current = slot.machine.current();
            drop(slot);
            window.close();
            return current;
        }

        let update_task = spawn_update_loop(Arc::downgrade(self), id, self.config.update_interval());
        slot.session = Some(FloatingSurfaceSession {
            id,
            window,
            update_task: Some(update_task),
        });
        drop(slot);

        // First frame, painted only for a surface that is actually kept.
        self.project_tick(id);
        SessionState::Open
    }

    async fn open_fallback(self: &Arc<Self>, id: u64) -> Result<SessionState, PipError> {
        let Some(media) = self.document.media_element(&self.config.selectors.media) else {
            return Err(self.fail_fallback("no media element is ready".to_string()));
        };

        if self.document.picture_in_picture_active() {
            // The primitive presentation is already up, so toggling leaves it.
            return match self.document.exit_picture_in_picture().await {
                Ok(()) => {
                    self.settle_opening(SessionState::Closed);
                    Ok(SessionState::Closed)
                }
                Err(err) => Err(self.fail_fallback(err.to_string())),
            };
        }

        if let Err(err) = media.request_picture_in_picture().await {
            return Err(self.fail_fallback(err.to_string()));
        }

        self.watch_fallback_leave(&media);

        let cancelled = {
            let mut slot = self.lock_slot();
            if std::mem::take(&mut slot.close_requested) {
                self.transition(&mut slot, SessionState::Closed)?;
                true
            } else {
                self.transition(&mut slot, SessionState::FallbackOpen)?;
                slot.fallback_id = Some(id);
                false
            }
        };

        if cancelled {
            log::info!("[SESSION] close() arrived while opening, leaving media picture-in-picture");
            if let Err(err) = self.document.exit_picture_in_picture().await {
                log::warn!("Failed to leave media picture-in-picture: {}", err);
            }
            return Ok(SessionState::Closed);
        }
        Ok(SessionState::FallbackOpen)
    }

    /// Report a fallback failure to the user and return to `Closed`.
    fn fail_fallback(&self, reason: String) -> PipError {
        log::error!("[SESSION] Media picture-in-picture fallback failed: {}", reason);
        self.document.alert(&self.config.labels.fallback_failed);
        self.settle_opening(SessionState::Closed);
        PipError::FallbackFailed(reason)
    }

    fn settle_opening(&self, to: SessionState) {
        let mut slot = self.lock_slot();
        slot.close_requested = false;
        if let Err(err) = self.transition(&mut slot, to) {
            log::error!("[SESSION] {}", err);
        }
    }

    fn begin_close(&self) -> Teardown {
        let mut slot = self.lock_slot();
        match slot.machine.current() {
            SessionState::Closed => {
                log::debug!("[SESSION] close() on a closed session, nothing to do");
                Teardown::Nothing
            }
            SessionState::Opening => {
                log::info!("[SESSION] close() while opening, the pending surface will be discarded");
                slot.close_requested = true;
                Teardown::Nothing
            }
            SessionState::Open => {
                let session = slot.session.take();
                if let Err(err) = self.transition(&mut slot, SessionState::Closed) {
                    log::error!("[SESSION] {}", err);
                }
                session.map(Teardown::Surface).unwrap_or(Teardown::Nothing)
            }
            SessionState::FallbackOpen => {
                slot.fallback_id = None;
                if let Err(err) = self.transition(&mut slot, SessionState::Closed) {
                    log::error!("[SESSION] {}", err);
                }
                Teardown::Fallback
            }
        }
    }

    /// End the rich session `id` if it is still the open one.
    fn end_rich_session(&self, id: u64, close_window: bool, trigger: &str) -> bool {
        let session = {
            let mut slot = self.lock_slot();
            let is_current = slot.machine.current() == SessionState::Open
                && slot.session.as_ref().map(|session| session.id) == Some(id);
            if !is_current {
                return false;
            }
            let session = slot.session.take();
            if let Err(err) = self.transition(&mut slot, SessionState::Closed) {
                log::error!("[SESSION] {}", err);
            }
            session
        };

        log_session_transition(trigger, "Open", "Closed");
        if let Some(session) = session {
            session.release(close_window);
        }
        true
    }

    /// Listen for the user leaving media picture-in-picture, once per media element.
    ///
    /// The listener outlives any single fallback session and ends whichever one
    /// is current when it fires.
    fn watch_fallback_leave(self: &Arc<Self>, media: &Arc<dyn MediaElement>) {
        let media_key = media_key(media);
        {
            let mut slot = self.lock_slot();
            if slot.is_watching(media_key) {
                return;
            }
            slot.watched_media = Some(Arc::downgrade(media));
        }

        let weak = Arc::downgrade(self);
        media.on_leave_picture_in_picture(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.end_fallback_session(media_key);
            }
        }));
        log::debug!("Watching media element for picture-in-picture exits");
    }

    fn end_fallback_session(&self, media_key: usize) -> bool {
        let mut slot = self.lock_slot();
        if slot.machine.current() != SessionState::FallbackOpen || !slot.is_watching(media_key) {
            return false;
        }
        let id = slot.fallback_id.take();
        if let Err(err) = self.transition(&mut slot, SessionState::Closed) {
            log::error!("[SESSION] {}", err);
        }
        drop(slot);
        log::debug!("Fallback session {:?} left picture-in-picture", id);
        log_session_transition("left picture-in-picture", "FallbackOpen", "Closed");
        true
    }

    /// One projection cycle. Returns false once session `id` is no longer open.
    fn project_tick(&self, id: u64) -> bool {
        let window = {
            let slot = self.lock_slot();
            match &slot.session {
                Some(session)
                    if session.id == id && slot.machine.current() == SessionState::Open =>
                {
                    session.window.clone()
                }
                _ => return false,
            }
        };
        self.paint(window.as_ref());
        true
    }

    fn paint(&self, window: &dyn FloatingWindow) {
        if catch_unwind(AssertUnwindSafe(|| self.projector.project(window))).is_err() {
            log::error!("Projection cycle panicked, keeping the previous frame");
        }
    }
}

/// Identity of a media element, independent of the trait object's vtable.
fn media_key(media: &Arc<dyn MediaElement>) -> usize {
    Arc::as_ptr(media) as *const () as usize
}

fn spawn_update_loop(weak: Weak<ManagerInner>, id: u64, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let Some(inner) = weak.upgrade() else {
                break;
            };
            if !inner.project_tick(id) {
                log::debug!("Update loop for session {} stopping", id);
                break;
            }
        }
    })
}
