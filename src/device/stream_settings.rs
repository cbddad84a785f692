use thiserror::Error;

const MAX_FPS: u32 = 60;

/// Output size and frame rate of the preview stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    width: u32,
    height: u32,
    fps: u32,
}

impl StreamSettings {
    pub fn new(width: u32, height: u32, fps: u32) -> Result<Self, SettingsError> {
        if width == 0 || height == 0 || fps == 0 {
            return Err(SettingsError::NotPositive);
        }

        if fps > MAX_FPS {
            return Err(SettingsError::FpsTooHigh(fps));
        }

        Ok(StreamSettings { width, height, fps })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("width, height and fps must be positive")]
    NotPositive,
    #[error("fps cannot exceed {MAX_FPS}, got {0}")]
    FpsTooHigh(u32),
}
