use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedbackKind {
    Zoom(f64),
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackPhase {
    Visible,
    Fading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    id: u64,
    kind: FeedbackKind,
    phase: FeedbackPhase,
}

impl Toast {
    pub fn kind(&self) -> FeedbackKind {
        self.kind
    }

    pub fn phase(&self) -> FeedbackPhase {
        self.phase
    }

    pub fn text(&self) -> String {
        match self.kind {
            FeedbackKind::Zoom(level) => format!("Zoom: {:.0}%", level * 100.0),
            FeedbackKind::Error => "Zoom Error!".to_string(),
        }
    }
}

/// A single self-dismissing indicator. Showing a new toast replaces the current one.
#[derive(Debug, Clone)]
pub struct FeedbackIndicator {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    tx: watch::Sender<Option<Toast>>,
    next_id: AtomicU64,
    dismissal: Mutex<Option<JoinHandle<()>>>,
    visible: Duration,
    fade: Duration,
}

impl FeedbackIndicator {
    pub fn new(visible: Duration, fade: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        FeedbackIndicator {
            inner: Arc::new(Inner {
                tx,
                next_id: AtomicU64::new(0),
                dismissal: Mutex::new(None),
                visible,
                fade,
            }),
        }
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<Toast> {
        self.inner.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.inner.tx.subscribe()
    }

    pub fn show(&self, kind: FeedbackKind) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            kind,
            phase: FeedbackPhase::Visible,
        };
        debug!(toast = toast.text(), "💬 Showing feedback");
        self.inner.tx.send_replace(Some(toast));

        let inner = self.inner.clone();
        let dismissal = tokio::spawn(async move {
            sleep(inner.visible).await;
            inner.update_if_current(id, |toast| toast.phase = FeedbackPhase::Fading);
            sleep(inner.fade).await;
            inner.clear_if_current(id);
        });

        let previous = self.inner.dismissal.lock().unwrap_or_else(PoisonError::into_inner).replace(dismissal);
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Inner {
    // Timers of a replaced toast must never touch its successor
    fn update_if_current(&self, id: u64, update: impl FnOnce(&mut Toast)) {
        self.tx.send_if_modified(|toast| match toast {
            Some(current) if current.id == id => {
                update(current);
                true
            }
            _ => false,
        });
    }

    fn clear_if_current(&self, id: u64) {
        self.tx.send_if_modified(|toast| {
            if toast.as_ref().is_some_and(|current| current.id == id) {
                *toast = None;
                return true;
            }
            false
        });
    }
}
