mod controller;
mod sinks;
mod update;

pub use controller::{OptimisticControl, PendingRequest, Resolution};
pub use sinks::{FocusCommand, GainCommand, ZoomCommand};
pub use update::FailurePolicy;

#[cfg(test)]
pub(crate) use controller::tests::{GatedSink, rejected};
#[cfg(test)]
pub(crate) use update::UpdateStatus;
