pub mod control_range;
pub mod units;
pub mod value_domain;

pub use control_range::{ControlName, ControlRange, InvalidRange};
pub use units::ControlUnit;
pub use value_domain::{NumericDomain, ValueDomain};
