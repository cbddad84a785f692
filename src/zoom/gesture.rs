use crate::optimistic::{OptimisticControl, Resolution};
use crate::power::{PreviewSurface, WheelDisposition, WheelEvent};
use crate::zoom::feedback::{FeedbackIndicator, FeedbackKind};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Turns scroll-wheel gestures over the preview into zoom requests.
pub struct ZoomGestureController {
    control: OptimisticControl<f64>,
    step: f64,
    feedback: FeedbackIndicator,
    surface: Arc<dyn PreviewSurface>,
    last_gesture: Mutex<Option<u64>>,
}

impl ZoomGestureController {
    pub fn new(control: OptimisticControl<f64>, step: f64, feedback: FeedbackIndicator, surface: Arc<dyn PreviewSurface>) -> Self {
        ZoomGestureController {
            control,
            step,
            feedback,
            surface,
            last_gesture: Mutex::new(None),
        }
    }

    pub fn level(&self) -> f64 {
        self.control.value()
    }

    pub fn feedback(&self) -> &FeedbackIndicator {
        &self.feedback
    }

    /// Entry point for every bound wheel listener.
    ///
    /// Both overlapping surfaces report the same gesture; only its first delivery zooms.
    pub fn handle_wheel(&self, event: &WheelEvent) -> WheelDisposition {
        if !self.surface.is_mounted() {
            return WheelDisposition::Propagate;
        }

        {
            let mut last_gesture = self.last_gesture.lock().unwrap_or_else(PoisonError::into_inner);
            if *last_gesture == Some(event.gesture_id) {
                debug!(gesture_id = event.gesture_id, target = ?event.target, "Gesture already handled");
                return WheelDisposition::Consumed;
            }
            *last_gesture = Some(event.gesture_id);
        }

        self.zoom_by(event.delta_y);
        WheelDisposition::Consumed
    }

    /// Positive deltas zoom out, negative deltas zoom in.
    ///
    /// Returns `None` when the level cannot move (already at a bound), in which case neither a
    /// request nor feedback is produced.
    #[instrument(skip(self), fields(level = self.level()))]
    pub fn zoom_by(&self, delta_y: f64) -> Option<JoinHandle<()>> {
        if delta_y == 0.0 || delta_y.is_nan() {
            return None;
        }

        let level = self.control.value();
        let candidate = if delta_y > 0.0 { level - self.step } else { level + self.step };

        let pending = self.control.propose(candidate)?;
        info!("🔍 Zoom {} → {}", level, pending.value());
        self.feedback.show(FeedbackKind::Zoom(pending.value()));

        let feedback = self.feedback.clone();
        Some(tokio::spawn(async move {
            if let Resolution::RolledBack { .. } = pending.resolved().await {
                feedback.show(FeedbackKind::Error);
            }
        }))
    }
}
