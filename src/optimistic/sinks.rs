use crate::device::{CommandRejected, DeviceClient};
use crate::domain::ControlUnit;
use crate::optimistic::controller::CommandSink;
use async_trait::async_trait;

/// Moves the lens to a manual position.
#[derive(Debug, Clone)]
pub struct FocusCommand {
    client: DeviceClient,
}

impl FocusCommand {
    pub fn new(client: DeviceClient) -> Self {
        FocusCommand { client }
    }
}

#[async_trait]
impl CommandSink<f64> for FocusCommand {
    async fn send(&self, value: f64) -> Result<(), CommandRejected> {
        self.client.set_focus(ControlUnit::RawFloat.to_hardware(value)).await
    }
}

/// Sets the analog gain. Takes the slider value (gain ×100).
#[derive(Debug, Clone)]
pub struct GainCommand {
    client: DeviceClient,
}

impl GainCommand {
    pub fn new(client: DeviceClient) -> Self {
        GainCommand { client }
    }
}

#[async_trait]
impl CommandSink<f64> for GainCommand {
    async fn send(&self, value: f64) -> Result<(), CommandRejected> {
        self.client.set_gain(ControlUnit::GainX100.to_hardware(value)).await
    }
}

#[derive(Debug, Clone)]
pub struct ZoomCommand {
    client: DeviceClient,
}

impl ZoomCommand {
    pub fn new(client: DeviceClient) -> Self {
        ZoomCommand { client }
    }
}

#[async_trait]
impl CommandSink<f64> for ZoomCommand {
    async fn send(&self, level: f64) -> Result<(), CommandRejected> {
        self.client.zoom(level).await
    }
}
