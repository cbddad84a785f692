use crate::app_config::AppConfig;
use crate::device::{CommandRejected, DeviceClient};
use crate::power::surface::{ListenerToken, PreviewSurface, SurfaceTarget, WheelEvent, WheelHandler};
use crate::zoom::ZoomGestureController;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Starts and stops the camera's hardware stream.
#[async_trait]
pub trait PowerSwitch: Send + Sync {
    async fn start(&self) -> Result<(), CommandRejected>;
    async fn stop(&self) -> Result<(), CommandRejected>;
}

#[async_trait]
impl PowerSwitch for DeviceClient {
    async fn start(&self) -> Result<(), CommandRejected> {
        DeviceClient::start(self).await
    }

    async fn stop(&self) -> Result<(), CommandRejected> {
        DeviceClient::stop(self).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Active,
    Sleeping,
}

/// Tracks whether the camera is awake and is the only owner of the zoom listener bindings.
///
/// Listeners are never bound while the camera sleeps.
#[derive(Clone)]
pub struct CameraPowerLifecycle {
    inner: Arc<Inner>,
}

struct Inner {
    status: Mutex<PowerStatus>,
    switch: Arc<dyn PowerSwitch>,
    surface: Arc<dyn PreviewSurface>,
    zoom: Arc<ZoomGestureController>,
    initial_settle: Duration,
    wake_settle: Duration,
}

#[derive(Debug)]
struct PowerStatus {
    active: bool,
    // Bumped on every transition so attachments scheduled before it are dropped
    epoch: u64,
    listeners: Option<ListenerToken>,
}

impl CameraPowerLifecycle {
    pub fn new(config: &AppConfig, switch: Arc<dyn PowerSwitch>, surface: Arc<dyn PreviewSurface>, zoom: Arc<ZoomGestureController>) -> Self {
        CameraPowerLifecycle {
            inner: Arc::new(Inner {
                status: Mutex::new(PowerStatus {
                    active: config.lifecycle().start_active(),
                    epoch: 0,
                    listeners: None,
                }),
                switch,
                surface,
                zoom,
                initial_settle: config.lifecycle().initial_settle(),
                wake_settle: config.lifecycle().wake_settle(),
            }),
        }
    }

    pub fn state(&self) -> PowerState {
        if self.inner.status().active { PowerState::Active } else { PowerState::Sleeping }
    }

    pub fn listeners_attached(&self) -> bool {
        self.inner.status().listeners.is_some()
    }

    /// Brings the preview in line with the initial power state and binds listeners if awake.
    pub fn initialize(&self) -> Option<JoinHandle<bool>> {
        let (active, epoch) = {
            let status = self.inner.status();
            (status.active, status.epoch)
        };
        self.inner.surface.set_visible(active);

        if !active {
            info!("💤 Camera starts asleep");
            return None;
        }

        let inner = self.inner.clone();
        Some(tokio::spawn(async move { inner.attach_after_settle(epoch, inner.initial_settle).await }))
    }

    /// Turns the camera on. A no-op when it is already active.
    pub fn wake(&self) -> Option<JoinHandle<()>> {
        let epoch = {
            let mut status = self.inner.status();
            if status.active {
                debug!("☀️ Camera is already active");
                return None;
            }
            status.active = true;
            status.epoch += 1;
            status.epoch
        };
        self.inner.surface.set_visible(true);
        info!("☀️ Waking camera...");

        let inner = self.inner.clone();
        Some(tokio::spawn(async move {
            match inner.switch.start().await {
                Ok(()) => info!("☀️ Waking camera... OK"),
                // The power toggle keeps reflecting the operator's intent and zoom stays usable
                Err(e) => warn!("⚠️ Waking camera... failed, {}", e),
            }
            inner.attach_after_settle(epoch, inner.wake_settle).await;
        }))
    }

    /// Turns the camera off and releases the listener bindings. A no-op when already asleep.
    pub fn sleep(&self) -> Option<JoinHandle<()>> {
        let listeners = {
            let mut status = self.inner.status();
            if !status.active {
                debug!("💤 Camera is already sleeping");
                return None;
            }
            status.active = false;
            status.epoch += 1;
            status.listeners.take()
        };

        if let Some(listeners) = listeners {
            debug!(targets = ?listeners.targets(), "Detaching zoom listeners");
            listeners.dispose();
        }
        self.inner.surface.set_visible(false);
        info!("💤 Putting camera to sleep...");

        let inner = self.inner.clone();
        Some(tokio::spawn(async move {
            match inner.switch.stop().await {
                Ok(()) => info!("💤 Putting camera to sleep... OK"),
                Err(e) => warn!("⚠️ Putting camera to sleep... failed, {}", e),
            }
        }))
    }
}

impl Inner {
    fn status(&self) -> MutexGuard<'_, PowerStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[instrument(skip(self))]
    async fn attach_after_settle(&self, epoch: u64, settle: Duration) -> bool {
        if timeout(settle, self.surface.ready()).await.is_err() {
            debug!("No readiness signal within {:?}, attaching anyway", settle);
        }
        self.attach(epoch)
    }

    fn attach(&self, epoch: u64) -> bool {
        let mut status = self.status();
        if !status.active || status.epoch != epoch {
            debug!("Power state changed since scheduling, skipping listener attachment");
            return false;
        }

        if status.listeners.is_some() {
            debug!("Zoom listeners are already attached");
            return false;
        }

        let zoom = self.zoom.clone();
        let handler: WheelHandler = Arc::new(move |event: &WheelEvent| zoom.handle_wheel(event));

        let Some(preview) = self.surface.bind_wheel(SurfaceTarget::Preview, handler.clone()) else {
            warn!("⚠️ Camera preview element not found, zoom is unavailable");
            return false;
        };

        let mut token = ListenerToken::default();
        token.push(SurfaceTarget::Preview, preview);
        if let Some(feed) = self.surface.bind_wheel(SurfaceTarget::Feed, handler) {
            token.push(SurfaceTarget::Feed, feed);
        }

        info!(targets = ?token.targets(), "🖱️ Attached zoom listeners");
        status.listeners = Some(token);
        true
    }
}
