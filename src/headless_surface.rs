use crate::power::{PreviewSurface, SurfaceTarget, Unbind, WheelDisposition, WheelEvent, WheelHandler};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;
use tracing::trace;

struct Binding {
    id: u64,
    target: SurfaceTarget,
    handler: WheelHandler,
}

/// A preview surface without a screen, driven by the operator shell.
///
/// Every scroll is delivered to all bound targets with one gesture id, like a browser
/// delivering a wheel event to an image and its container.
pub struct HeadlessSurface {
    visible: AtomicBool,
    shown: Notify,
    bindings: Arc<Mutex<Vec<Binding>>>,
    next_binding: AtomicU64,
    next_gesture: AtomicU64,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        HeadlessSurface {
            visible: AtomicBool::new(false),
            shown: Notify::new(),
            bindings: Arc::new(Mutex::new(Vec::new())),
            next_binding: AtomicU64::new(0),
            next_gesture: AtomicU64::new(0),
        }
    }

    #[cfg(test)]
    pub fn bound_targets(&self) -> Vec<SurfaceTarget> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner).iter().map(|binding| binding.target).collect()
    }

    pub fn scroll(&self, delta_y: f64) -> WheelDisposition {
        let gesture_id = self.next_gesture.fetch_add(1, Ordering::Relaxed);
        let listeners: Vec<(SurfaceTarget, WheelHandler)> = self
            .bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|binding| (binding.target, binding.handler.clone()))
            .collect();

        let mut disposition = WheelDisposition::Propagate;
        for (target, handler) in listeners {
            let event = WheelEvent { gesture_id, delta_y, target };
            if handler(&event) == WheelDisposition::Consumed {
                disposition = WheelDisposition::Consumed;
            }
        }

        trace!(gesture_id, ?disposition, "Scroll dispatched");
        disposition
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        HeadlessSurface::new()
    }
}

#[async_trait]
impl PreviewSurface for HeadlessSurface {
    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
        if visible {
            self.shown.notify_waiters();
        }
    }

    fn is_mounted(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn bind_wheel(&self, target: SurfaceTarget, handler: WheelHandler) -> Option<Unbind> {
        let id = self.next_binding.fetch_add(1, Ordering::Relaxed);
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner).push(Binding { id, target, handler });

        let bindings = self.bindings.clone();
        Some(Unbind::new(move || {
            bindings.lock().unwrap_or_else(PoisonError::into_inner).retain(|binding| binding.id != id);
        }))
    }

    async fn ready(&self) {
        loop {
            let shown = self.shown.notified();
            if self.is_mounted() {
                return;
            }
            shown.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::ListenerToken;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn scroll_without_bindings_propagates() {
        let surface = HeadlessSurface::new();

        assert_eq!(surface.scroll(-1.0), WheelDisposition::Propagate);
    }

    #[test]
    fn scroll_reaches_every_binding_with_one_gesture_id() {
        let surface = HeadlessSurface::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for target in [SurfaceTarget::Preview, SurfaceTarget::Feed] {
            let seen = seen.clone();
            let _binding = surface.bind_wheel(
                target,
                Arc::new(move |event: &WheelEvent| {
                    seen.lock().unwrap().push((event.gesture_id, event.target));
                    WheelDisposition::Consumed
                }),
            );
        }

        assert_eq!(surface.scroll(-1.0), WheelDisposition::Consumed);
        assert_eq!(*seen.lock().unwrap(), vec![(0, SurfaceTarget::Preview), (0, SurfaceTarget::Feed)]);
    }

    #[test]
    fn disposing_a_token_removes_only_its_own_bindings() {
        let surface = HeadlessSurface::new();
        let handler: WheelHandler = Arc::new(|_: &WheelEvent| WheelDisposition::Consumed);

        let mut first = ListenerToken::default();
        first.push(SurfaceTarget::Preview, surface.bind_wheel(SurfaceTarget::Preview, handler.clone()).expect("binding"));
        let mut second = ListenerToken::default();
        second.push(SurfaceTarget::Feed, surface.bind_wheel(SurfaceTarget::Feed, handler).expect("binding"));

        first.dispose();
        assert_eq!(surface.bound_targets(), vec![SurfaceTarget::Feed]);

        second.dispose();
        assert_eq!(surface.scroll(1.0), WheelDisposition::Propagate);
    }

    #[tokio::test]
    async fn ready_resolves_once_visible() {
        let surface = Arc::new(HeadlessSurface::new());

        let waiter = tokio::spawn({
            let surface = surface.clone();
            async move { surface.ready().await }
        });
        tokio::task::yield_now().await;
        surface.set_visible(true);

        tokio::time::timeout(Duration::from_secs(1), waiter).await.expect("ready").expect("task");
    }
}
