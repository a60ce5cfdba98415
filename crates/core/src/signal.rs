use std::fmt;
use std::ops::{Index, Mul};

use serde::{Deserialize, Serialize};

/// A named audio-derived control channel, normalized to [0, 1]. The set is
/// fixed: every frame carries an intensity for each member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    FreqAll,
    FreqHigh,
    FreqLow,
    SustainedLow,
    SustainedHigh,
    Drop,
    Strobe,
    Pulse,
}

impl Signal {
    pub const ALL: [Signal; 8] = [
        Signal::FreqAll,
        Signal::FreqHigh,
        Signal::FreqLow,
        Signal::SustainedLow,
        Signal::SustainedHigh,
        Signal::Drop,
        Signal::Strobe,
        Signal::Pulse,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn name(&self) -> &'static str {
        match self {
            Signal::FreqAll => "freq_all",
            Signal::FreqHigh => "freq_high",
            Signal::FreqLow => "freq_low",
            Signal::SustainedLow => "sustained_low",
            Signal::SustainedHigh => "sustained_high",
            Signal::Drop => "drop",
            Signal::Strobe => "strobe",
            Signal::Pulse => "pulse",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One tick's snapshot of every signal intensity plus a monotonic timestamp
/// in seconds. Immutable once built apart from uniform scaling, which the
/// director uses for the warmup ramp.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    values: [f32; Signal::COUNT],
    pub time: f64,
}

impl Frame {
    /// A silent frame: every signal at zero.
    pub fn new(time: f64) -> Self {
        Frame {
            values: [0.0; Signal::COUNT],
            time,
        }
    }

    pub fn with(time: f64, intensities: &[(Signal, f32)]) -> Self {
        let mut frame = Frame::new(time);
        for (signal, value) in intensities {
            frame.set(*signal, *value);
        }
        frame
    }

    pub fn set(&mut self, signal: Signal, value: f32) {
        self.values[signal as usize] = value.clamp(0.0, 1.0);
    }

    /// Uniformly scaled copy, clamped back into [0, 1].
    pub fn scaled(&self, factor: f32) -> Self {
        let mut values = self.values;
        for value in &mut values {
            *value = (*value * factor).clamp(0.0, 1.0);
        }
        Frame {
            values,
            time: self.time,
        }
    }
}

impl Index<Signal> for Frame {
    type Output = f32;

    fn index(&self, signal: Signal) -> &f32 {
        &self.values[signal as usize]
    }
}

impl Mul<f32> for Frame {
    type Output = Frame;

    fn mul(self, factor: f32) -> Frame {
        self.scaled(factor)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_set_clamps_to_unit_range() {
        let mut frame = Frame::new(0.0);
        frame.set(Signal::FreqAll, 1.5);
        frame.set(Signal::Drop, -0.3);
        assert_eq!(frame[Signal::FreqAll], 1.0);
        assert_eq!(frame[Signal::Drop], 0.0);
    }

    #[test]
    fn test_scaling_is_uniform() {
        let frame = Frame::with(2.0, &[(Signal::FreqLow, 0.8), (Signal::Pulse, 0.4)]);
        let scaled = frame * 0.5;
        assert_relative_eq!(scaled[Signal::FreqLow], 0.4, epsilon = 1e-6);
        assert_relative_eq!(scaled[Signal::Pulse], 0.2, epsilon = 1e-6);
        assert_eq!(scaled[Signal::Strobe], 0.0);
        assert_eq!(scaled.time, 2.0);
    }
}
