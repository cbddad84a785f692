use crate::domain::units::{ControlUnit, DISPLAY_GAIN_MAX, DISPLAY_GAIN_MIN, clamp_display_exposure_max};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Hardware controls whose range the device reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlName {
    LensPosition,
    ExposureTime,
    AnalogueGain,
}

impl ControlName {
    pub const ALL: [ControlName; 3] = [ControlName::LensPosition, ControlName::ExposureTime, ControlName::AnalogueGain];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlName::LensPosition => "LensPosition",
            ControlName::ExposureTime => "ExposureTime",
            ControlName::AnalogueGain => "AnalogueGain",
        }
    }

    pub fn unit(&self) -> ControlUnit {
        match self {
            ControlName::LensPosition => ControlUnit::RawFloat,
            ControlName::ExposureTime => ControlUnit::MicrosecondsToMilliseconds,
            ControlName::AnalogueGain => ControlUnit::GainX100,
        }
    }

    pub fn display_step(&self) -> f64 {
        match self {
            ControlName::LensPosition => 0.1,
            ControlName::ExposureTime => 1.0,
            ControlName::AnalogueGain => 1.0,
        }
    }
}

impl Display for ControlName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("unknown control '{0}'")]
pub struct UnknownControl(pub String);

impl FromStr for ControlName {
    type Err = UnknownControl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownControl(s.to_string()))
    }
}

/// A control's range as last reported by the device, in native and in UI units.
///
/// Built once per successful load and replaced wholesale on reload.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlRange {
    name: ControlName,
    hardware_min: f64,
    hardware_max: f64,
    hardware_current: f64,
    display_min: f64,
    display_max: f64,
    display_current: f64,
    display_step: f64,
}

impl ControlRange {
    pub fn from_hardware(name: ControlName, min: f64, max: f64, current: f64) -> Result<Self, InvalidRange> {
        if !(min <= current && current <= max) {
            return Err(InvalidRange { min, max, current });
        }

        let unit = name.unit();
        let (display_min, display_max) = match unit {
            ControlUnit::RawFloat => (unit.to_display(min), unit.to_display(max)),
            ControlUnit::MicrosecondsToMilliseconds => {
                let display_max = clamp_display_exposure_max(unit.to_display(max));
                // The cap may fall below a long minimum exposure
                (unit.to_display(min).min(display_max), display_max)
            }
            // The device documents a fixed analog gain span, whatever it reports.
            ControlUnit::GainX100 => (DISPLAY_GAIN_MIN, DISPLAY_GAIN_MAX),
        };

        Ok(ControlRange {
            name,
            hardware_min: min,
            hardware_max: max,
            hardware_current: current,
            display_min,
            display_max,
            display_current: unit.to_display(current),
            display_step: name.display_step(),
        })
    }

    pub fn name(&self) -> ControlName {
        self.name
    }

    pub fn unit(&self) -> ControlUnit {
        self.name.unit()
    }

    pub fn display_min(&self) -> f64 {
        self.display_min
    }

    pub fn display_max(&self) -> f64 {
        self.display_max
    }

    pub fn display_current(&self) -> f64 {
        self.display_current
    }

    pub fn display_step(&self) -> f64 {
        self.display_step
    }
}

impl Display for ControlRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = self.unit().symbol();
        write!(
            f,
            "{}: {}{symbol} in [{}{symbol}, {}{symbol}] step {} (device reports {} in [{}, {}])",
            self.name,
            self.display_current,
            self.display_min,
            self.display_max,
            self.display_step,
            self.hardware_current,
            self.hardware_min,
            self.hardware_max
        )
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("current value {current} lies outside of [{min}, {max}]")]
pub struct InvalidRange {
    pub min: f64,
    pub max: f64,
    pub current: f64,
}
