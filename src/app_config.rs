use config::{Config, ConfigError};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    device: Device,
    zoom: Zoom,
    lifecycle: Lifecycle,
    feedback: Feedback,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::with_prefix("LENSDECK").separator("__"))
            .build()?
            .try_deserialize()?;
        config.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let Zoom { min, max, step } = self.zoom;
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(ConfigError::Message(format!("zoom.min ({min}) must not exceed zoom.max ({max})")));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(ConfigError::Message(format!("zoom.step must be positive, got {step}")));
        }
        Ok(self)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }
}

#[derive(Debug, Deserialize)]
pub struct Device {
    url: String,
    #[serde(with = "humantime_serde")]
    request_timeout: Duration,
}

impl Device {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Zoom {
    min: f64,
    max: f64,
    step: f64,
}

impl Zoom {
    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

#[derive(Debug, Deserialize)]
pub struct Lifecycle {
    start_active: bool,
    #[serde(with = "humantime_serde")]
    initial_settle: Duration,
    #[serde(with = "humantime_serde")]
    wake_settle: Duration,
}

impl Lifecycle {
    pub fn start_active(&self) -> bool {
        self.start_active
    }

    pub fn initial_settle(&self) -> Duration {
        self.initial_settle
    }

    pub fn wake_settle(&self) -> Duration {
        self.wake_settle
    }
}

#[derive(Debug, Deserialize)]
pub struct Feedback {
    #[serde(with = "humantime_serde")]
    visible: Duration,
    #[serde(with = "humantime_serde")]
    fade: Duration,
}

impl Feedback {
    pub fn visible(&self) -> Duration {
        self.visible
    }

    pub fn fade(&self) -> Duration {
        self.fade
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                device: Device {
                    url: "http://camera.local".to_string(),
                    request_timeout: Duration::from_secs(5),
                },
                zoom: Zoom { min: 1.0, max: 4.0, step: 0.1 },
                lifecycle: Lifecycle {
                    start_active: true,
                    initial_settle: Duration::from_millis(200),
                    wake_settle: Duration::from_millis(500),
                },
                feedback: Feedback {
                    visible: Duration::from_millis(2000),
                    fade: Duration::from_millis(300),
                },
            },
        }
    }

    pub fn device_url(mut self, url: String) -> Self {
        self.config.device.url = url;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.device.request_timeout = timeout;
        self
    }

    pub fn start_active(mut self, active: bool) -> Self {
        self.config.lifecycle.start_active = active;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
