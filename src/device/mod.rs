mod client;
mod error;
mod stream_settings;
mod wire;

pub use client::{DeviceClient, new_client};
pub use error::CommandRejected;
pub use stream_settings::{SettingsError, StreamSettings};
pub use wire::CameraStatus;
