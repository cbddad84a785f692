mod feedback;
mod gesture;

pub use feedback::{FeedbackIndicator, FeedbackKind, FeedbackPhase};
pub use gesture::ZoomGestureController;
