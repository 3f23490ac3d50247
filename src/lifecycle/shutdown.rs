//! Shutdown coordination for the running application.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Latched stop trigger.
///
/// The trigger is observed even when it fires before anyone is waiting,
/// so a pipeline hook can request an immediate stop during Configure and
/// the Run phase will still return promptly.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<ShutdownInner>,
}

struct ShutdownInner {
    triggered: AtomicBool,
    notify: Notify,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ShutdownInner {
                triggered: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Request a stop. Idempotent.
    pub fn trigger(&self) {
        if !self.inner.triggered.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether a stop has been requested.
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Wait until a stop is requested. Returns immediately if one already was.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.inner.triggered.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
