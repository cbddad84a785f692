use crate::app_config::AppConfig;
use crate::device::{CameraStatus, CommandRejected, DeviceClient, StreamSettings};
use crate::domain::units::{DISPLAY_GAIN_MAX, DISPLAY_GAIN_MIN};
use crate::domain::{ControlName, ControlRange, NumericDomain};
use crate::optimistic::{FailurePolicy, FocusCommand, GainCommand, OptimisticControl, PendingRequest, ZoomCommand};
use crate::power::{CameraPowerLifecycle, PowerState, PreviewSurface};
use crate::range_loader::{ControlRangeLoader, LoadError};
use crate::zoom::{FeedbackIndicator, ZoomGestureController};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Wires the camera controls together and is the single place they are reached through.
pub struct CameraConsole {
    client: DeviceClient,
    loader: ControlRangeLoader,
    request_timeout: Duration,
    ranges: HashMap<ControlName, ControlRange>,
    // Focus and gain only exist once their range loaded; failures are logged and not rolled back
    focus: Option<OptimisticControl<f64>>,
    gain: Option<OptimisticControl<f64>>,
    zoom: Arc<ZoomGestureController>,
    lifecycle: CameraPowerLifecycle,
}

impl CameraConsole {
    pub fn new(config: &AppConfig, client: DeviceClient, surface: Arc<dyn PreviewSurface>) -> Self {
        let request_timeout = config.device().request_timeout();

        let zoom_config = config.zoom();
        let zoom_domain = NumericDomain::new(zoom_config.min(), zoom_config.max())
            .with_step(zoom_config.step())
            .with_base(zoom_config.min());
        let zoom_control = OptimisticControl::new(
            "zoom",
            zoom_config.min(),
            Arc::new(zoom_domain),
            Arc::new(ZoomCommand::new(client.clone())),
            FailurePolicy::Rollback,
            request_timeout,
        );
        let feedback = FeedbackIndicator::new(config.feedback().visible(), config.feedback().fade());
        let zoom = Arc::new(ZoomGestureController::new(zoom_control, zoom_config.step(), feedback, surface.clone()));

        let lifecycle = CameraPowerLifecycle::new(config, Arc::new(client.clone()), surface, zoom.clone());

        CameraConsole {
            loader: ControlRangeLoader::new(client.clone()),
            client,
            request_timeout,
            ranges: HashMap::new(),
            focus: None,
            gain: None,
            zoom,
            lifecycle,
        }
    }

    /// Primes every control from the device, then brings up the power lifecycle.
    ///
    /// Controls whose range cannot be loaded stay uninitialized for this session.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Option<JoinHandle<bool>> {
        for range in self.loader.load_all().await.into_iter().flatten() {
            self.install(range);
        }
        info!("🎚️ {} of {} controls initialized", self.ranges.len(), ControlName::ALL.len());

        self.lifecycle.initialize()
    }

    /// Re-fetches one range. On failure the current range and control stay as they are.
    pub async fn reload(&mut self, name: ControlName) -> Result<ControlRange, LoadError> {
        let range = self.loader.load(name).await?;
        self.install(range.clone());
        Ok(range)
    }

    fn install(&mut self, range: ControlRange) {
        match range.name() {
            ControlName::LensPosition => {
                let sink = Arc::new(FocusCommand::new(self.client.clone()));
                let domain = Arc::new(NumericDomain::for_range(&range));
                self.focus = Some(OptimisticControl::new("focus", range.display_current(), domain, sink, FailurePolicy::Retain, self.request_timeout));
            }
            ControlName::AnalogueGain => {
                let sink = Arc::new(GainCommand::new(self.client.clone()));
                let domain = Arc::new(NumericDomain::new(DISPLAY_GAIN_MIN, DISPLAY_GAIN_MAX).with_step(range.display_step()));
                self.gain = Some(OptimisticControl::new("gain", range.display_current(), domain, sink, FailurePolicy::Retain, self.request_timeout));
            }
            // No device command sets the exposure, the range is informational
            ControlName::ExposureTime => {}
        }

        self.ranges.insert(range.name(), range);
    }

    pub fn range(&self, name: ControlName) -> Option<&ControlRange> {
        self.ranges.get(&name)
    }

    pub fn ranges(&self) -> impl Iterator<Item = &ControlRange> {
        ControlName::ALL.into_iter().filter_map(|name| self.ranges.get(&name))
    }

    pub fn focus(&self) -> Option<&OptimisticControl<f64>> {
        self.focus.as_ref()
    }

    pub fn gain(&self) -> Option<&OptimisticControl<f64>> {
        self.gain.as_ref()
    }

    pub fn zoom(&self) -> &Arc<ZoomGestureController> {
        &self.zoom
    }

    pub fn power_state(&self) -> PowerState {
        self.lifecycle.state()
    }

    pub fn zoom_listeners_attached(&self) -> bool {
        self.lifecycle.listeners_attached()
    }

    pub fn set_focus(&self, lens_position: f64) -> Option<PendingRequest<f64>> {
        let Some(focus) = &self.focus else {
            warn!("⚠️ Focus control is not initialized");
            return None;
        };
        focus.propose(lens_position)
    }

    /// Takes the slider value, analog gain ×100.
    pub fn set_gain(&self, gain_x100: f64) -> Option<PendingRequest<f64>> {
        let Some(gain) = &self.gain else {
            warn!("⚠️ Gain control is not initialized");
            return None;
        };
        gain.propose(gain_x100)
    }

    #[instrument(skip(self))]
    pub async fn trigger_autofocus(&self) -> Result<String, CommandRejected> {
        let result = self.client.trigger_autofocus().await;
        match &result {
            Ok(message) => info!("🎯 {}", message),
            Err(e) => warn!("⚠️ Unable to trigger autofocus: {}", e),
        }
        result
    }

    pub async fn status(&self) -> Result<CameraStatus, CommandRejected> {
        self.client.status().await
    }

    #[instrument(skip(self))]
    pub async fn configure_stream(&self, settings: StreamSettings) -> Result<(), CommandRejected> {
        self.client.configure_stream(settings).await
    }

    pub fn wake(&self) -> Option<JoinHandle<()>> {
        self.lifecycle.wake()
    }

    pub fn sleep(&self) -> Option<JoinHandle<()>> {
        self.lifecycle.sleep()
    }
}
