use async_trait::async_trait;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// The two overlapping elements a wheel gesture can be observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceTarget {
    Preview,
    Feed,
}

/// A scroll-wheel event as delivered by one listener.
///
/// Listeners on overlapping surfaces report the same physical gesture with the same `gesture_id`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub gesture_id: u64,
    pub delta_y: f64,
    pub target: SurfaceTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDisposition {
    /// Native scrolling and page zoom must be suppressed.
    Consumed,
    Propagate,
}

pub type WheelHandler = Arc<dyn Fn(&WheelEvent) -> WheelDisposition + Send + Sync>;

/// The UI collaborator that renders the live preview.
#[async_trait]
pub trait PreviewSurface: Send + Sync {
    /// Shows or hides the preview, called synchronously on power transitions.
    fn set_visible(&self, visible: bool);

    fn is_mounted(&self) -> bool;

    /// Binds `handler` to wheel events on `target`. `None` when the element does not exist.
    fn bind_wheel(&self, target: SurfaceTarget, handler: WheelHandler) -> Option<Unbind>;

    /// Resolves once the preview is laid out and can receive listeners.
    ///
    /// Surfaces without a readiness signal never resolve and callers fall back to a settle delay.
    async fn ready(&self) {
        std::future::pending::<()>().await
    }
}

/// Removes one listener binding when run.
pub struct Unbind(Box<dyn FnOnce() + Send>);

impl Unbind {
    pub fn new(unbind: impl FnOnce() + Send + 'static) -> Self {
        Unbind(Box::new(unbind))
    }
}

/// Owns every wheel binding of one attachment. Dropping it removes them.
#[derive(Default)]
pub struct ListenerToken {
    bindings: Vec<(SurfaceTarget, Unbind)>,
}

impl ListenerToken {
    pub fn push(&mut self, target: SurfaceTarget, unbind: Unbind) {
        self.bindings.push((target, unbind));
    }

    pub fn targets(&self) -> Vec<SurfaceTarget> {
        self.bindings.iter().map(|(target, _)| *target).collect()
    }

    pub fn dispose(self) {}
}

impl Drop for ListenerToken {
    fn drop(&mut self) {
        for (_, Unbind(unbind)) in self.bindings.drain(..) {
            unbind();
        }
    }
}

impl Debug for ListenerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerToken").field("targets", &self.targets()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn disposing_a_token_runs_every_unbind() {
        let unbound = Arc::new(AtomicUsize::new(0));
        let mut token = ListenerToken::default();
        for target in [SurfaceTarget::Preview, SurfaceTarget::Feed] {
            let unbound = unbound.clone();
            token.push(target, Unbind::new(move || {
                unbound.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert_eq!(token.targets(), vec![SurfaceTarget::Preview, SurfaceTarget::Feed]);
        token.dispose();

        assert_eq!(unbound.load(Ordering::SeqCst), 2);
    }
}
