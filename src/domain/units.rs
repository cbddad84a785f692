/// Largest exposure the UI offers, in milliseconds.
pub const MAX_DISPLAY_EXPOSURE_MS: f64 = 5000.0;

/// The analog gain slider always spans 1.0x to 64.0x, stored ×100.
pub const DISPLAY_GAIN_MIN: f64 = 100.0;
pub const DISPLAY_GAIN_MAX: f64 = 6400.0;

pub fn to_display_exposure(hardware_microseconds: f64) -> f64 {
    (hardware_microseconds / 1000.0).round()
}

/// Caps the upper bound of an exposure range. Never apply this to the current value.
pub fn clamp_display_exposure_max(display_milliseconds: f64) -> f64 {
    display_milliseconds.min(MAX_DISPLAY_EXPOSURE_MS)
}

pub fn to_hardware_exposure(display_milliseconds: f64) -> f64 {
    display_milliseconds * 1000.0
}

pub fn to_display_gain(hardware_gain: f64) -> f64 {
    (hardware_gain * 100.0).round()
}

pub fn to_hardware_gain(display_gain_x100: f64) -> f64 {
    display_gain_x100 / 100.0
}

pub fn to_display_focus(lens_position: f64) -> f64 {
    lens_position
}

pub fn to_hardware_focus(lens_position: f64) -> f64 {
    lens_position
}

/// How a control's native value maps onto the value shown in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlUnit {
    RawFloat,
    MicrosecondsToMilliseconds,
    GainX100,
}

impl ControlUnit {
    pub fn to_display(&self, hardware: f64) -> f64 {
        match self {
            ControlUnit::RawFloat => to_display_focus(hardware),
            ControlUnit::MicrosecondsToMilliseconds => to_display_exposure(hardware),
            ControlUnit::GainX100 => to_display_gain(hardware),
        }
    }

    pub fn to_hardware(&self, display: f64) -> f64 {
        match self {
            ControlUnit::RawFloat => to_hardware_focus(display),
            ControlUnit::MicrosecondsToMilliseconds => to_hardware_exposure(display),
            ControlUnit::GainX100 => to_hardware_gain(display),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ControlUnit::RawFloat => "",
            ControlUnit::MicrosecondsToMilliseconds => "ms",
            ControlUnit::GainX100 => "x",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(100.0, 0.0)]
    #[case(499.0, 0.0)]
    #[case(500.0, 1.0)]
    #[case(500_000.0, 500.0)]
    #[case(10_000_000.0, 10_000.0)]
    fn to_display_exposure_rounds_to_milliseconds(#[case] microseconds: f64, #[case] expected: f64) {
        assert_eq!(to_display_exposure(microseconds), expected);
    }

    #[rstest]
    #[case(10_000.0, 5000.0)]
    #[case(5000.0, 5000.0)]
    #[case(1200.0, 1200.0)]
    fn clamp_display_exposure_max_caps_at_five_seconds(#[case] milliseconds: f64, #[case] expected: f64) {
        assert_eq!(clamp_display_exposure_max(milliseconds), expected);
    }

    #[test]
    fn exposure_round_trip_has_millisecond_granularity() {
        for microseconds in (0..=10_000_000u64).step_by(777) {
            let x = microseconds as f64;
            let expected = (x / 1000.0).round() * 1000.0;
            assert_eq!(to_hardware_exposure(to_display_exposure(x)), expected, "round trip of {x}");
        }
    }

    #[rstest]
    #[case(1.0, 100.0)]
    #[case(2.5, 250.0)]
    #[case(1.123, 112.0)]
    #[case(64.0, 6400.0)]
    fn to_display_gain_scales_by_a_hundred(#[case] gain: f64, #[case] expected: f64) {
        assert_eq!(to_display_gain(gain), expected);
    }

    #[test]
    fn to_hardware_gain_divides_by_a_hundred() {
        assert_eq!(to_hardware_gain(250.0), 2.5);
    }

    #[test]
    fn focus_is_passed_through() {
        assert_eq!(to_display_focus(3.7), 3.7);
        assert_eq!(to_hardware_focus(3.7), 3.7);
    }

    #[test]
    fn conversion_is_monotonic() {
        for unit in [ControlUnit::RawFloat, ControlUnit::MicrosecondsToMilliseconds, ControlUnit::GainX100] {
            let low = unit.to_display(1_000.0);
            let high = unit.to_display(250_000.0);
            assert!(low <= high, "{unit:?} is not monotonic");
        }
    }
}
