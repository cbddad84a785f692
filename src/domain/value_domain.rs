use crate::domain::control_range::ControlRange;

// Quantized values are snapped to this grid so repeated steps never drift.
const SNAP: f64 = 1e9;

/// Normalizes raw user input into a value the control can hold.
pub trait ValueDomain<T>: Send + Sync {
    /// `None` when the input has no place in the domain at all.
    fn normalize(&self, value: T) -> Option<T>;
}

/// A closed numeric interval, optionally quantized to multiples of `step` from `base`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericDomain {
    min: f64,
    max: f64,
    step: Option<f64>,
    base: f64,
}

impl NumericDomain {
    pub fn new(min: f64, max: f64) -> Self {
        NumericDomain { min, max, step: None, base: min }
    }

    pub fn with_step(mut self, step: f64) -> Self {
        if step > 0.0 {
            self.step = Some(step);
        }
        self
    }

    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }

    pub fn for_range(range: &ControlRange) -> Self {
        NumericDomain::new(range.display_min(), range.display_max()).with_step(range.display_step())
    }
}

impl ValueDomain<f64> for NumericDomain {
    fn normalize(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }

        let quantized = match self.step {
            Some(step) => {
                let steps = ((value - self.base) / step).round();
                snap(self.base + steps * step)
            }
            None => value,
        };

        // Clamping after quantizing keeps bounds reachable even when they are not on the step grid
        Some(snap(quantized.clamp(self.min, self.max)))
    }
}

fn snap(value: f64) -> f64 {
    (value * SNAP).round() / SNAP
}
