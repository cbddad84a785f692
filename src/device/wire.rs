use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ControlRangeRequest<'a> {
    pub control_name: &'a str,
}

// Failed lookups only carry `success` and `message`
#[derive(Debug, Deserialize)]
pub struct ControlRangeResponse {
    pub success: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub current: Option<f64>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FocusRequest {
    pub mode: FocusMode,
    pub position: f64,
}

// Autofocus goes through `trigger_af`, so only manual positioning is ever sent here
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    Manual,
}

#[derive(Debug, Serialize)]
pub struct GainRequest {
    pub gain: f64,
}

#[derive(Debug, Serialize)]
pub struct StreamSettingsRequest {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// The loose `{success?, message?}` envelope most device commands answer with.
#[derive(Debug, Default, Deserialize)]
pub struct MessageResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraStatus {
    pub started: bool,
    pub resolution: Option<(u32, u32)>,
    pub available: bool,
    pub message: Option<String>,
}
