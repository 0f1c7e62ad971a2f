use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc;

/// Fan-out of "the document changed" notifications to live observers.
///
/// Hosts embed one hub and call [`MutationHub::notify`] whenever their tree
/// changes; the locator subscribes through [`MutationHub::observe`].
#[derive(Clone, Default)]
pub struct MutationHub {
    inner: Arc<Mutex<HubInner>>,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    observers: HashMap<u64, mpsc::UnboundedSender<()>>,
}

impl MutationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self) -> MutationObserver {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut inner = lock_or_recover(&self.inner);
            inner.next_id += 1;
            let id = inner.next_id;
            inner.observers.insert(id, tx);
            id
        };
        log::trace!("Mutation observer {} connected", id);

        MutationObserver {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
            connected: true,
        }
    }

    /// Deliver one notification to every connected observer.
    pub fn notify(&self) -> usize {
        let mut inner = lock_or_recover(&self.inner);
        inner.observers.retain(|_, tx| tx.send(()).is_ok());
        inner.observers.len()
    }

    pub fn observer_count(&self) -> usize {
        lock_or_recover(&self.inner).observers.len()
    }
}

/// A subtree-wide observation handle. Disconnects on drop.
pub struct MutationObserver {
    id: u64,
    rx: mpsc::UnboundedReceiver<()>,
    hub: Weak<Mutex<HubInner>>,
    connected: bool,
}

impl MutationObserver {
    /// Wait for the next change. `None` once the hub is gone or we disconnected.
    pub async fn next_mutation(&mut self) -> Option<()> {
        if !self.connected {
            return None;
        }
        self.rx.recv().await
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        self.rx.close();
        if let Some(hub) = self.hub.upgrade() {
            lock_or_recover(&hub).observers.remove(&self.id);
        }
        log::trace!("Mutation observer {} disconnected", self.id);
    }
}

impl Drop for MutationObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn lock_or_recover(inner: &Mutex<HubInner>) -> MutexGuard<'_, HubInner> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Recovering from poisoned mutex in MutationHub");
            poisoned.into_inner()
        }
    }
}
