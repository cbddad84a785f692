mod lifecycle;
mod surface;

pub use lifecycle::{CameraPowerLifecycle, PowerState};
pub use surface::{PreviewSurface, SurfaceTarget, Unbind, WheelDisposition, WheelEvent, WheelHandler};

#[cfg(test)]
pub(crate) use surface::ListenerToken;
